//! Aggregation of transaction values and proofs of value conservation.
//!
//! [`add()`] sums a list of values into a single [`Value`]. Values of the same kind are
//! summed directly: plaintext amounts arithmetically, commitments homomorphically. When
//! commitments live under different bases, no direct sum exists; the caller then supplies
//! [`AuxiliaryVariables`] naming a *target* value and proving that the inputs add up to
//! it, and `add` returns the target once the proofs check.
//!
//! The proof is a [`LinearProof`] over the deduplicated value and blinding generators
//! of all involved bases: the discrete logarithms of `Σ inputs − target` must satisfy
//! `Σ value logs = −Σ plaintext` (plus the target amount if the target is plaintext),
//! while blinding logs are unconstrained. A solvable target also carries a
//! [`FormatProof`] for its commitment pair.
//!
//! [`add()`]: crate::conservation::add
//! [`Value`]: crate::slots::Value
//! [`AuxiliaryVariables`]: crate::conservation::AuxiliaryVariables
//! [`LinearProof`]: crate::proofs::LinearProof
//! [`FormatProof`]: crate::proofs::FormatProof

use crate::crypto::{Generator, Point, Scalar, G};
use crate::error::Error;
use crate::proofs::{FormatProof, FormatStatement, LinearProof, LinearStatement};
use crate::secrets::Opening;
use crate::slots::{Base, ConfidentialValue, PlaintextValue, Privacy, Value};

/// Proof carried by [`AuxiliaryVariables`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuxiliaryProof {
    Linear(LinearProof),
    Format(FormatProof),
}

/// Caller-supplied bases, values and proofs disambiguating an aggregation.
///
/// | Case | `bases` | `values` | `zks` |
/// |------|---------|----------|-------|
/// | plain sum | none | none | none |
/// | fold into anonymous base | the base | none | none |
/// | cross-base | input bases, then target base | target | linear, then format |
///
/// In the cross-base case, secret input bases precede anonymous ones, and the format
/// proof is present only for a solvable target.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuxiliaryVariables {
    pub bases: Vec<Base>,
    pub values: Vec<Value>,
    pub zks: Vec<AuxiliaryProof>,
}

impl AuxiliaryVariables {
    pub fn is_empty(&self) -> bool {
        self.bases.is_empty() && self.values.is_empty() && self.zks.is_empty()
    }

    /// Bundle folding plaintext amounts into an anonymous base.
    pub fn anonymous_fold(base: Base) -> Self {
        AuxiliaryVariables {
            bases: vec![base],
            ..Self::default()
        }
    }
}

/// Witness of one input for [`prove()`].
///
/// [`prove()`]: crate::conservation::prove
#[derive(Debug, Clone)]
pub struct InputWitness<'a> {
    pub base: &'a Base,
    pub value: &'a Value,
    pub opening: &'a Opening,
}

/// Sums `values`, using `aux` to certify sums across bases.
///
/// # Errors
///
/// - `AuxiliarySizeMismatch` if the bundle does not fit any aggregation case
/// - `AuxiliaryTypeMismatch` if a bundle element has the wrong tier or kind
/// - `ProofCheckFailed` if a bundled proof does not check
pub fn add(aux: Option<&AuxiliaryVariables>, values: &[Value]) -> Result<Value, Error> {
    let result = match aux {
        None => plain_sum(values),
        Some(aux) if aux.is_empty() => plain_sum(values),
        Some(aux) if aux.bases.len() == 1 && aux.values.is_empty() && aux.zks.is_empty() => {
            anonymous_fold(&aux.bases[0], values)
        }
        Some(aux) => cross_base(aux, values),
    };
    if let Err(ref e) = result {
        warn!("rejected aggregation of {} values: {}", values.len(), e);
    }
    result
}

/// Running sums over a list of values.
struct Sums {
    plaintext: Scalar,
    secret: Vec<ConfidentialValue>,
    anonymous: Vec<ConfidentialValue>,
}

impl Sums {
    fn new(values: &[Value]) -> Self {
        let mut sums = Sums {
            plaintext: Scalar::ZERO,
            secret: vec![],
            anonymous: vec![],
        };
        for value in values {
            match value {
                Value::Plaintext(value) => sums.plaintext += value.value,
                Value::Secret(value) => sums.secret.push(*value),
                Value::Anonymous(value) => sums.anonymous.push(*value),
            }
        }
        sums
    }

    /// Folds the plaintext sum into commitments committed against `generator`.
    fn fold(&self, generator: &Generator, committed: &[ConfidentialValue]) -> ConfidentialValue {
        let commitment = committed
            .iter()
            .fold(*generator * self.plaintext, |acc, value| acc + value.commitment);
        let decryption = committed
            .iter()
            .map(|value| value.decryption)
            .sum::<Option<Point>>();
        ConfidentialValue {
            commitment,
            decryption,
        }
    }
}

fn plain_sum(values: &[Value]) -> Result<Value, Error> {
    let sums = Sums::new(values);
    if !sums.anonymous.is_empty() {
        return Err(Error::AuxiliarySizeMismatch);
    }
    match values {
        [] => Ok(Value::Plaintext(PlaintextValue::new(Scalar::ZERO))),
        [Value::Plaintext(value)] => Ok(Value::Plaintext(PlaintextValue::new(value.value))),
        [value] => Ok(*value),
        _ if sums.secret.is_empty() => Ok(Value::Plaintext(PlaintextValue::new(sums.plaintext))),
        _ => Ok(Value::Secret(sums.fold(&G, &sums.secret))),
    }
}

fn anonymous_fold(base: &Base, values: &[Value]) -> Result<Value, Error> {
    let sums = Sums::new(values);
    if sums.anonymous.is_empty() || !sums.secret.is_empty() {
        return Err(Error::AuxiliarySizeMismatch);
    }
    match base {
        Base::Anonymous(base) => Ok(Value::Anonymous(sums.fold(&base.g, &sums.anonymous))),
        _ => Err(Error::AuxiliaryTypeMismatch("fold base must be anonymous")),
    }
}

fn cross_base(aux: &AuxiliaryVariables, values: &[Value]) -> Result<Value, Error> {
    let secret_count = values.iter().filter(|v| v.privacy() == Privacy::Secret).count();
    let anonymous_count = values.iter().filter(|v| v.privacy() == Privacy::Anonymous).count();
    if aux.bases.len() != secret_count + anonymous_count + 1 || aux.values.len() != 1 {
        return Err(Error::AuxiliarySizeMismatch);
    }

    let target_base = &aux.bases[secret_count + anonymous_count];
    let target = &aux.values[0];
    let target_format = target
        .confidential()
        .map_or(false, ConfidentialValue::is_solvable);
    let expected_zks = if target_format { 2 } else { 1 };
    if aux.zks.len() != expected_zks {
        return Err(Error::AuxiliarySizeMismatch);
    }

    let mut equation = Equation::default();
    for value in values {
        if let Value::Plaintext(value) = value {
            equation.plaintext_input(value);
        }
    }
    for (value, base) in ordered_inputs(values).zip(&aux.bases) {
        equation.input(base, value, None)?;
    }
    equation.target(target_base, target, None)?;
    let (statement, _) = equation.finish()?;

    let linear = match aux.zks[0] {
        AuxiliaryProof::Linear(ref proof) => proof,
        _ => return Err(Error::AuxiliaryTypeMismatch("first proof must be linear")),
    };
    if !linear.verify(&statement) {
        return Err(Error::ProofCheckFailed("conservation"));
    }

    if target_format {
        let format = match aux.zks[1] {
            AuxiliaryProof::Format(ref proof) => proof,
            _ => return Err(Error::AuxiliaryTypeMismatch("second proof must be format")),
        };
        let statement = format_statement(target_base, target)?;
        if !format.verify(&statement) {
            return Err(Error::ProofCheckFailed("target format"));
        }
    }
    Ok(*target)
}

/// Confidential values in bundle order: secret values first, then anonymous ones.
fn ordered_inputs<'a>(values: &'a [Value]) -> impl Iterator<Item = &'a Value> + 'a {
    let secret = values.iter().filter(|v| v.privacy() == Privacy::Secret);
    let anonymous = values.iter().filter(|v| v.privacy() == Privacy::Anonymous);
    secret.chain(anonymous)
}

fn format_statement(base: &Base, value: &Value) -> Result<FormatStatement, Error> {
    let (g, h) = base
        .generators()
        .ok_or(Error::AuxiliaryTypeMismatch("target base is plaintext"))?;
    let value = value
        .confidential()
        .ok_or(Error::AuxiliaryTypeMismatch("target value is plaintext"))?;
    let c2 = value.decryption.ok_or(Error::NotSolvable)?;
    Ok(FormatStatement {
        g,
        h,
        c1: value.commitment,
        c2,
    })
}

/// Builder of the linear statement certifying `Σ inputs = target`.
///
/// Generators are deduplicated: contributions of values sharing a generator are merged
/// into one witness entry.
#[derive(Default)]
struct Equation {
    generators: Vec<Generator>,
    coefficients: Vec<Scalar>,
    witness: Vec<Scalar>,
    image: Point,
    constant: Scalar,
}

impl Equation {
    fn term(
        &mut self,
        generator: Generator,
        coefficient: Scalar,
        contribution: Scalar,
    ) -> Result<(), Error> {
        match self.generators.iter().position(|g| *g == generator) {
            Some(i) if self.coefficients[i] == coefficient => {
                self.witness[i] += contribution;
                Ok(())
            }
            Some(_) => Err(Error::AuxiliaryTypeMismatch(
                "generator used both for values and blindings",
            )),
            None => {
                self.generators.push(generator);
                self.coefficients.push(coefficient);
                self.witness.push(contribution);
                Ok(())
            }
        }
    }

    fn confidential(
        &mut self,
        base: &Base,
        value: &Value,
        opening: Option<&Opening>,
        negate: bool,
    ) -> Result<(), Error> {
        if base.privacy() != value.privacy() {
            return Err(Error::AuxiliaryTypeMismatch("base and value tiers differ"));
        }
        let (g, h) = base
            .generators()
            .ok_or(Error::AuxiliaryTypeMismatch("base is plaintext"))?;
        let committed = value
            .confidential()
            .ok_or(Error::AuxiliaryTypeMismatch("value is plaintext"))?;

        let (mut v, mut r) = opening.map_or((Scalar::ZERO, Scalar::ZERO), |opening| {
            (*opening.value(), *opening.blinding())
        });
        if negate {
            v = -v;
            r = -r;
            self.image -= committed.commitment;
        } else {
            self.image += committed.commitment;
        }
        self.term(g, Scalar::ONE, v)?;
        self.term(h, Scalar::ZERO, r)
    }

    fn plaintext_input(&mut self, value: &PlaintextValue) {
        self.constant -= value.value;
    }

    fn input(
        &mut self,
        base: &Base,
        value: &Value,
        opening: Option<&Opening>,
    ) -> Result<(), Error> {
        match value {
            Value::Plaintext(value) => {
                self.plaintext_input(value);
                Ok(())
            }
            _ => self.confidential(base, value, opening, false),
        }
    }

    fn target(
        &mut self,
        base: &Base,
        value: &Value,
        opening: Option<&Opening>,
    ) -> Result<(), Error> {
        match value {
            Value::Plaintext(value) if base.privacy() == Privacy::Plaintext => {
                self.constant += value.value;
                Ok(())
            }
            Value::Plaintext(_) => Err(Error::AuxiliaryTypeMismatch("base and value tiers differ")),
            _ => self.confidential(base, value, opening, true),
        }
    }

    fn finish(self) -> Result<(LinearStatement, Vec<Scalar>), Error> {
        let statement = LinearStatement::new(
            self.coefficients,
            self.constant,
            self.image,
            self.generators,
        )?;
        Ok((statement, self.witness))
    }
}

/// Builds the bundle proving that `inputs` add up to `target_opening` under
/// `target_base`, and the target value itself.
///
/// Pass the input values to [`add()`] in the order of `inputs`.
///
/// [`add()`]: crate::conservation::add
pub fn prove(
    inputs: &[InputWitness],
    target_base: &Base,
    target_opening: &Opening,
    solvable: bool,
) -> Result<(AuxiliaryVariables, Value), Error> {
    let (v, r) = (target_opening.value(), target_opening.blinding());
    let target = match target_base.generators() {
        None => Value::Plaintext(PlaintextValue::new(*v)),
        Some((g, h)) => {
            let value = ConfidentialValue {
                commitment: Point::commit(&g, &h, v, r),
                decryption: if solvable { Some(g * r) } else { None },
            };
            match target_base {
                Base::Secret(_) => Value::Secret(value),
                _ => Value::Anonymous(value),
            }
        }
    };

    let mut equation = Equation::default();
    for input in inputs.iter().filter(|i| i.value.privacy() == Privacy::Plaintext) {
        equation.input(input.base, input.value, Some(input.opening))?;
    }
    let mut bases = vec![];
    for privacy in &[Privacy::Secret, Privacy::Anonymous] {
        for input in inputs.iter().filter(|i| i.value.privacy() == *privacy) {
            equation.input(input.base, input.value, Some(input.opening))?;
            bases.push(*input.base);
        }
    }
    bases.push(*target_base);
    equation.target(target_base, &target, Some(target_opening))?;

    let (statement, witness) = equation.finish()?;
    let mut zks = vec![AuxiliaryProof::Linear(LinearProof::prove(&statement, &witness)?)];
    if target.confidential().map_or(false, ConfidentialValue::is_solvable) {
        let statement = format_statement(target_base, &target)?;
        let proof = FormatProof::prove(&statement, v, r)?;
        zks.push(AuxiliaryProof::Format(proof));
    }

    let aux = AuxiliaryVariables {
        bases,
        values: vec![target],
        zks,
    };
    Ok((aux, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::PrivateKey;

    fn commit(base: &Base, opening: &Opening) -> Value {
        let (g, h) = base.generators().unwrap();
        let value = ConfidentialValue {
            commitment: Point::commit(&g, &h, opening.value(), opening.blinding()),
            decryption: Some(g * opening.blinding()),
        };
        match base {
            Base::Secret(_) => Value::Secret(value),
            _ => Value::Anonymous(value),
        }
    }

    fn plain(amount: u64) -> Value {
        Value::Plaintext(PlaintextValue::new(Scalar::from(amount)))
    }

    #[test]
    fn secret_sum_is_homomorphic() {
        let base = Base::Secret(PrivateKey::random().unwrap().secret_base());
        let first = Opening::new(100).unwrap();
        let second = Opening::new(250).unwrap();
        let values = [commit(&base, &first), commit(&base, &second)];

        let sum = add(None, &values).unwrap();
        assert_eq!(sum, commit(&base, &(&first + &second)));
    }

    #[test]
    fn plaintext_amounts_fold_into_secret_pool() {
        let key = PrivateKey::random().unwrap();
        let base = Base::Secret(key.secret_base());
        let opening = Opening::new(40).unwrap();
        let values = [plain(2), commit(&base, &opening), plain(3)];

        let sum = add(None, &values).unwrap();
        assert_eq!(sum, commit(&base, &(&opening + &Opening::plain(5))));
        assert_eq!(key.solve(&sum, &base).unwrap(), 45);

        assert_eq!(add(None, &[plain(2), plain(3)]).unwrap(), plain(5));
        assert_eq!(add(None, &[]).unwrap(), plain(0));
        assert_eq!(add(Some(&AuxiliaryVariables::default()), &[plain(7)]).unwrap(), plain(7));
    }

    #[test]
    fn plaintext_amounts_fold_into_anonymous_base() {
        let key = PrivateKey::random().unwrap();
        let base = Base::Anonymous(key.anonymous_base().unwrap());
        let opening = Opening::new(40).unwrap();
        let values = [commit(&base, &opening), plain(2)];
        let aux = AuxiliaryVariables::anonymous_fold(base);

        let sum = add(Some(&aux), &values).unwrap();
        assert_eq!(sum, commit(&base, &(&opening + &Opening::plain(2))));
        assert_eq!(key.solve(&sum, &base).unwrap(), 42);
    }

    #[test]
    fn bundle_must_fit_the_case() {
        let key = PrivateKey::random().unwrap();
        let secret = Base::Secret(key.secret_base());
        let anonymous = Base::Anonymous(key.anonymous_base().unwrap());
        let anonymous_value = commit(&anonymous, &Opening::new(1).unwrap());
        let secret_value = commit(&secret, &Opening::new(1).unwrap());

        assert_eq!(
            add(None, &[anonymous_value]).unwrap_err(),
            Error::AuxiliarySizeMismatch
        );
        assert_eq!(
            add(
                Some(&AuxiliaryVariables::anonymous_fold(anonymous)),
                &[anonymous_value, secret_value]
            )
            .unwrap_err(),
            Error::AuxiliarySizeMismatch
        );
        assert_eq!(
            add(
                Some(&AuxiliaryVariables::anonymous_fold(secret)),
                &[anonymous_value]
            )
            .unwrap_err(),
            Error::AuxiliaryTypeMismatch("fold base must be anonymous")
        );

        let too_many = AuxiliaryVariables {
            bases: vec![secret, secret, secret],
            values: vec![secret_value],
            zks: vec![],
        };
        assert_eq!(
            add(Some(&too_many), &[secret_value]).unwrap_err(),
            Error::AuxiliarySizeMismatch
        );
    }

    #[test]
    fn cross_base_conservation() {
        let sender = PrivateKey::random().unwrap();
        let receiver = PrivateKey::random().unwrap();
        let secret = Base::Secret(sender.secret_base());
        let anonymous = Base::Anonymous(sender.anonymous_base().unwrap());
        let target_base = Base::Anonymous(receiver.anonymous_base().unwrap());

        let openings = [
            Opening::new(100).unwrap(),
            Opening::new(20).unwrap(),
            Opening::plain(3),
        ];
        let bases = [anonymous, secret, Base::Plaintext(sender.plaintext_base())];
        let values = [
            commit(&anonymous, &openings[0]),
            commit(&secret, &openings[1]),
            plain(3),
        ];
        let inputs: Vec<_> = (0..3)
            .map(|i| InputWitness {
                base: &bases[i],
                value: &values[i],
                opening: &openings[i],
            })
            .collect();

        let target_opening = Opening::new(123).unwrap();
        let (aux, target) = prove(&inputs, &target_base, &target_opening, true).unwrap();
        assert_eq!(aux.bases, vec![secret, anonymous, target_base]);
        assert_eq!(aux.zks.len(), 2);
        assert_eq!(add(Some(&aux), &values).unwrap(), target);
        assert_eq!(receiver.solve(&target, &target_base).unwrap(), 123);

        // Claiming a different amount does not pass.
        let (aux, _) = prove(&inputs, &target_base, &Opening::new(124).unwrap(), true).unwrap();
        assert_eq!(
            add(Some(&aux), &values).unwrap_err(),
            Error::ProofCheckFailed("conservation")
        );
    }

    #[test]
    fn confidential_inputs_can_be_revealed() {
        let key = PrivateKey::random().unwrap();
        let secret = Base::Secret(key.secret_base());
        let other = Base::Secret(PrivateKey::random().unwrap().secret_base());
        let openings = [Opening::new(7).unwrap(), Opening::new(8).unwrap()];
        let values = [commit(&secret, &openings[0]), commit(&other, &openings[1])];
        let bases = [secret, other];
        let inputs: Vec<_> = (0..2)
            .map(|i| InputWitness {
                base: &bases[i],
                value: &values[i],
                opening: &openings[i],
            })
            .collect();

        let target_base = Base::Plaintext(key.plaintext_base());
        let (aux, target) = prove(&inputs, &target_base, &Opening::plain(15), false).unwrap();
        assert_eq!(aux.zks.len(), 1);
        assert_eq!(target, plain(15));
        assert_eq!(add(Some(&aux), &values).unwrap(), plain(15));
    }

    #[test]
    fn swapped_proofs_are_rejected() {
        let key = PrivateKey::random().unwrap();
        let secret = Base::Secret(key.secret_base());
        let opening = Opening::new(10).unwrap();
        let value = commit(&secret, &opening);
        let input = InputWitness {
            base: &secret,
            value: &value,
            opening: &opening,
        };
        let target_base = Base::Anonymous(key.anonymous_base().unwrap());
        let (mut aux, _) = prove(&[input], &target_base, &Opening::new(10).unwrap(), true).unwrap();
        aux.zks.swap(0, 1);
        assert_eq!(
            add(Some(&aux), &[value]).unwrap_err(),
            Error::AuxiliaryTypeMismatch("first proof must be linear")
        );
    }
}
