extern crate private_ledger;

use private_ledger::{
    conservation::{self, InputWitness},
    crypto::Scalar,
    proofs::FORMAT_PROOF_LEN,
    slots::{self, Base, Privacy, Slot},
    Error, Opening, PrivateKey, Transaction,
};

fn witness<'a>(slot: &'a Slot, opening: &'a Opening) -> InputWitness<'a> {
    InputWitness {
        base: slot.base(),
        value: slot.value(),
        opening,
    }
}

#[test]
fn secret_slot_survives_the_wire() {
    let key = PrivateKey::random().unwrap();
    let base = Base::Secret(key.secret_base());
    let output = Slot::output(&base, &Opening::new(114_514).unwrap(), true, None).unwrap();
    assert!(output.check_zks());

    let bytes = output.to_bytes();
    let decoded = Slot::from_slice(Privacy::Secret, &bytes).unwrap();
    assert_eq!(decoded.to_bytes(), bytes);
    assert!(decoded.check_zks());
    assert_eq!(key.solve(decoded.value(), decoded.base()).unwrap(), 114_514);

    let input = Slot::input(&output).unwrap();
    assert!(!input.mode().is_output());
    assert_eq!(input.base().to_bytes(), output.base().to_bytes());
    assert_eq!(input.value().to_bytes(), output.value().to_bytes());
    assert!(input.check_zks());
}

/// Flips one bit at every offset in `offsets`; each copy must fail either decoding
/// or checking.
fn assert_corruption_detected<I>(bytes: &[u8], offsets: I)
where
    I: IntoIterator<Item = usize>,
{
    for offset in offsets {
        for &mask in &[0x01_u8, 0x80] {
            let mut corrupted = bytes.to_vec();
            corrupted[offset] ^= mask;
            if let Ok(slot) = Slot::decode(&corrupted) {
                assert!(
                    !slot.check_zks(),
                    "corruption {:#04x} at {} went unnoticed",
                    mask,
                    offset
                );
            }
        }
    }
}

#[test]
fn corrupted_confidential_proofs_do_not_check() {
    let key = PrivateKey::random().unwrap();
    let base = Base::Anonymous(key.anonymous_base().unwrap());
    let output = Slot::output(&base, &Opening::new(42).unwrap(), true, None).unwrap();
    let bytes = output.to_bytes();

    // Every byte of the format proof, and at least one byte of every range proof field.
    let proofs_start = bytes.len() - slots::CONFIDENTIAL_ZK_LEN;
    let range_start = proofs_start + FORMAT_PROOF_LEN;
    let offsets = (proofs_start..range_start).chain((range_start..bytes.len()).step_by(31));
    assert_corruption_detected(&bytes, offsets);
}

#[test]
fn corrupted_signatures_do_not_check() {
    let key = PrivateKey::random().unwrap();
    let input = Slot::plaintext_input(&key, Scalar::ONE, Scalar::from(500_u64)).unwrap();
    let bytes = input.to_bytes();
    assert_eq!(bytes.len(), slots::PLAINTEXT_INPUT_SLOT_LEN);

    let signature_start = bytes.len() - slots::PLAINTEXT_ZK_LEN;
    assert_corruption_detected(&bytes, signature_start..bytes.len());
}

#[test]
fn secret_payment_with_change() {
    let alice = PrivateKey::random().unwrap();
    let bob = PrivateKey::random().unwrap();
    let alice_base = Base::Secret(alice.secret_base());
    let bob_base = Base::Anonymous(bob.anonymous_base().unwrap());

    let funding_opening = Opening::new(100).unwrap();
    let funding = Slot::output(&alice_base, &funding_opening, true, None).unwrap();
    let input = Slot::input(&funding).unwrap();
    assert_eq!(alice.solve(input.value(), input.base()).unwrap(), 100);

    let payment_opening = Opening::new(60).unwrap();
    let change_opening = Opening::new(40).unwrap();
    let payment = Slot::output(&bob_base, &payment_opening, true, None).unwrap();
    let change = Slot::output(&alice_base, &change_opening, true, None).unwrap();

    // Outputs live under different bases; certify that they add up to the spent value.
    let (output_aux, target) = conservation::prove(
        &[
            witness(&payment, &payment_opening),
            witness(&change, &change_opening),
        ],
        &alice_base,
        &funding_opening,
        true,
    )
    .unwrap();
    assert_eq!(&target, input.value());

    let transaction = Transaction::new(vec![input.clone()], vec![payment.clone(), change])
        .with_output_aux(output_aux.clone());
    transaction.verify().unwrap();
    assert_eq!(bob.solve(payment.value(), payment.base()).unwrap(), 60);

    // Alice tries to keep more change than she is owed.
    let greedy_opening = Opening::new(41).unwrap();
    let greedy = Slot::output(&alice_base, &greedy_opening, true, None).unwrap();
    let transaction =
        Transaction::new(vec![input], vec![payment, greedy]).with_output_aux(output_aux);
    assert!(transaction.verify().is_err());
}

#[test]
fn plaintext_deposit_into_secret_account() {
    let alice = PrivateKey::random().unwrap();
    let bob = PrivateKey::random().unwrap();
    let bob_base = Base::Secret(bob.secret_base());

    let input = Slot::plaintext_input(&alice, Scalar::from(7_u64), Scalar::from(50_u64)).unwrap();
    let deposit_opening = Opening::new(50).unwrap();
    let deposit = Slot::output(&bob_base, &deposit_opening, true, None).unwrap();

    let plain_opening = Opening::plain(50);
    let (input_aux, target) = conservation::prove(
        &[witness(&input, &plain_opening)],
        &bob_base,
        &deposit_opening,
        true,
    )
    .unwrap();
    assert_eq!(&target, deposit.value());

    let transaction = Transaction::new(vec![input.clone()], vec![deposit.clone()])
        .with_input_aux(input_aux.clone());
    transaction.verify().unwrap();

    // Without the bundle the plaintext amount cannot be compared to the commitment.
    let transaction = Transaction::new(vec![input.clone()], vec![deposit.clone()]);
    assert_eq!(transaction.verify(), Err(Error::ConservationViolated));

    // A signature made by someone else does not authorize the spend.
    let mallory = PrivateKey::random().unwrap();
    let forged =
        Slot::plaintext_input(&mallory, Scalar::from(7_u64), Scalar::from(50_u64)).unwrap();
    let mut bytes = input.to_bytes();
    let signature_start = bytes.len() - slots::PLAINTEXT_ZK_LEN;
    bytes[signature_start..].copy_from_slice(&forged.to_bytes()[signature_start..]);
    let stolen = Slot::decode(&bytes).unwrap();
    let transaction = Transaction::new(vec![stolen], vec![deposit]).with_input_aux(input_aux);
    assert_eq!(
        transaction.verify(),
        Err(Error::ProofCheckFailed("input signature"))
    );
}
