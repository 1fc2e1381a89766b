//! Transactions moving value between slots.

use crate::conservation::{add, AuxiliaryVariables};
use crate::error::Error;
use crate::slots::{Slot, Value};

/// Transfer of value from input slots to output slots.
///
/// # Notes
///
/// A transaction is valid if every slot carries valid proofs and the inputs add up to the
/// outputs. When inputs or outputs are committed under different bases, their sums are
/// certified by the auxiliary bundles (see [`add()`]); an absent bundle means the
/// values are summed directly.
///
/// [`add()`]: crate::conservation::add
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transaction {
    pub inputs: Vec<Slot>,
    pub outputs: Vec<Slot>,
    pub input_aux: Option<AuxiliaryVariables>,
    pub output_aux: Option<AuxiliaryVariables>,
}

impl Transaction {
    pub fn new(inputs: Vec<Slot>, outputs: Vec<Slot>) -> Self {
        Transaction {
            inputs,
            outputs,
            input_aux: None,
            output_aux: None,
        }
    }

    pub fn with_input_aux(mut self, aux: AuxiliaryVariables) -> Self {
        self.input_aux = Some(aux);
        self
    }

    pub fn with_output_aux(mut self, aux: AuxiliaryVariables) -> Self {
        self.output_aux = Some(aux);
        self
    }

    /// Checks slot directions and the proofs carried by every slot.
    pub fn verify_slots(&self) -> Result<(), Error> {
        for input in &self.inputs {
            if input.mode().is_output() {
                return Err(input.mode().mismatch("expected an input slot"));
            }
            if !input.check_zks() {
                return Err(Error::ProofCheckFailed("input signature"));
            }
        }
        for output in &self.outputs {
            if !output.mode().is_output() {
                return Err(output.mode().mismatch("expected an output slot"));
            }
            if !output.check_zks() {
                return Err(Error::ProofCheckFailed("output proofs"));
            }
        }
        Ok(())
    }

    /// Performs full verification of the transaction.
    pub fn verify(&self) -> Result<(), Error> {
        self.verify_slots()?;

        let inputs: Vec<Value> = self.inputs.iter().map(|slot| *slot.value()).collect();
        let outputs: Vec<Value> = self.outputs.iter().map(|slot| *slot.value()).collect();
        let input_sum = add(self.input_aux.as_ref(), &inputs)?;
        let output_sum = add(self.output_aux.as_ref(), &outputs)?;
        if input_sum != output_sum {
            debug!(
                "transaction rejected: {} inputs do not balance {} outputs",
                inputs.len(),
                outputs.len()
            );
            return Err(Error::ConservationViolated);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Scalar;
    use crate::secrets::{Opening, PrivateKey};
    use crate::slots::Base;

    #[test]
    fn plaintext_transfer_verifies() {
        let sender = PrivateKey::random().unwrap();
        let receiver = PrivateKey::random().unwrap();
        let input =
            Slot::plaintext_input(&sender, Scalar::ONE, Scalar::from(100_u64)).unwrap();
        let pay = |key: &PrivateKey, amount: u64| {
            let base = Base::Plaintext(key.plaintext_base());
            Slot::output(&base, &Opening::plain(amount), false, None).unwrap()
        };
        let outputs = vec![pay(&receiver, 60), pay(&sender, 40)];

        let transaction = Transaction::new(vec![input.clone()], outputs.clone());
        assert!(transaction.verify().is_ok());

        let mut outputs = outputs;
        outputs.pop();
        let transaction = Transaction::new(vec![input], outputs);
        assert_eq!(transaction.verify(), Err(Error::ConservationViolated));
    }

    #[test]
    fn slots_must_face_the_right_way() {
        let key = PrivateKey::random().unwrap();
        let base = Base::Secret(key.secret_base());
        let output = Slot::output(&base, &Opening::new(5).unwrap(), true, None).unwrap();
        let transaction = Transaction::new(vec![output.clone()], vec![output]);
        match transaction.verify() {
            Err(Error::SlotModeMismatch { .. }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
