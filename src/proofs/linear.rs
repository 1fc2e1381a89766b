//! Generalized Schnorr proof for a public linear relation between discrete logarithms.

use crate::crypto::{
    invert, random_scalars, scalar_to_bytes, Generator, Point, Scalar, Transcript, POINT_LEN,
    SCALAR_LEN,
};
use crate::error::Error;

use super::{inner_product, scalars_from_slice};

/// Public inputs: `image = Σ x_i·G_i` for a witness satisfying `Σ a_i·x_i = constant`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearStatement {
    coefficients: Vec<Scalar>,
    constant: Scalar,
    image: Point,
    generators: Vec<Generator>,
}

impl LinearStatement {
    pub fn new(
        coefficients: Vec<Scalar>,
        constant: Scalar,
        image: Point,
        generators: Vec<Generator>,
    ) -> Result<Self, Error> {
        if coefficients.len() != generators.len() {
            return Err(Error::LengthMismatch(coefficients.len(), generators.len()));
        }
        Ok(LinearStatement {
            coefficients,
            constant,
            image,
            generators,
        })
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    pub fn coefficients(&self) -> &[Scalar] {
        &self.coefficients
    }

    pub fn constant(&self) -> &Scalar {
        &self.constant
    }

    pub fn image(&self) -> &Point {
        &self.image
    }

    pub fn generators(&self) -> &[Generator] {
        &self.generators
    }

    fn challenge(&self, commitment: &Point) -> Scalar {
        Transcript::new()
            .append_points(&self.generators)
            .append_point(&self.image)
            .append_point(commitment)
            .challenge()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearProof {
    commitment: Point,
    responses: Vec<Scalar>,
}

impl LinearProof {
    /// Proves knowledge of `witness` for `statement`.
    ///
    /// Blindings are random except for the one at the last non-zero coefficient, which is
    /// solved so that the blindings satisfy `Σ a_i·v_i = 0`.
    pub fn prove(statement: &LinearStatement, witness: &[Scalar]) -> Result<Self, Error> {
        let n = statement.len();
        if witness.len() != n {
            return Err(Error::LengthMismatch(n, witness.len()));
        }

        let coefficients = &statement.coefficients;
        let mut blindings = random_scalars(n)?;
        let pivot = coefficients.iter().rposition(|a| *a != Scalar::ZERO);
        if let Some(pivot) = pivot {
            let partial = coefficients
                .iter()
                .zip(&blindings)
                .take(pivot)
                .fold(Scalar::ZERO, |acc, (a, v)| acc + *a * v);
            if let Some(a_inv) = invert(&coefficients[pivot]) {
                blindings[pivot] = -partial * a_inv;
            }
        }

        let commitment = Point::multi_commit(&statement.generators, &blindings)?;
        let c = statement.challenge(&commitment);
        let responses = blindings
            .iter()
            .zip(witness)
            .map(|(v, x)| *v - c * x)
            .collect();
        Ok(LinearProof {
            commitment,
            responses,
        })
    }

    pub fn verify(&self, statement: &LinearStatement) -> bool {
        if self.responses.len() != statement.len() {
            debug!(
                "linear proof rejected: {} responses for {} generators",
                self.responses.len(),
                statement.len()
            );
            return false;
        }

        let c = statement.challenge(&self.commitment);
        let lhs = match Point::multi_commit(&statement.generators, &self.responses) {
            Ok(point) => point + statement.image * c,
            Err(_) => return false,
        };
        if lhs != self.commitment {
            debug!("linear proof rejected: commitment mismatch");
            return false;
        }

        let relation =
            inner_product(&statement.coefficients, &self.responses) + c * statement.constant;
        if relation != Scalar::ZERO {
            debug!("linear proof rejected: relation does not hold");
            return false;
        }
        true
    }

    pub fn from_slice(slice: &[u8]) -> Result<Self, Error> {
        if slice.len() < POINT_LEN || (slice.len() - POINT_LEN) % SCALAR_LEN != 0 {
            return Err(Error::decode(
                "linear proof",
                format!("invalid length {}", slice.len()),
            ));
        }
        Ok(LinearProof {
            commitment: Point::from_slice(&slice[..POINT_LEN])?,
            responses: scalars_from_slice(&slice[POINT_LEN..])?,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(POINT_LEN + SCALAR_LEN * self.responses.len());
        bytes.extend_from_slice(&self.commitment.to_bytes());
        for response in &self.responses {
            bytes.extend_from_slice(&scalar_to_bytes(response));
        }
        bytes
    }
}

impl_hex_codec!(LinearProof, "linear proof");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::random_scalar;

    fn generators(n: usize) -> Vec<Point> {
        (0..n)
            .map(|_| Point::from_scalar(&random_scalar().unwrap()))
            .collect()
    }

    fn statement(coefficients: Vec<Scalar>, witness: &[Scalar]) -> LinearStatement {
        let gens = generators(witness.len());
        let image = Point::multi_commit(&gens, witness).unwrap();
        let constant = inner_product(&coefficients, witness);
        LinearStatement::new(coefficients, constant, image, gens).unwrap()
    }

    #[test]
    fn honest_proof_verifies() {
        let witness = vec![
            Scalar::from(5_u64),
            random_scalar().unwrap(),
            Scalar::from(7_u64),
            random_scalar().unwrap(),
        ];
        let ones = vec![Scalar::ONE, Scalar::ZERO, Scalar::ONE, Scalar::ZERO];
        let statement = statement(ones, &witness);
        let proof = LinearProof::prove(&statement, &witness).unwrap();
        assert!(proof.verify(&statement));

        let bytes = proof.to_bytes();
        assert_eq!(bytes.len(), POINT_LEN + 4 * SCALAR_LEN);
        assert_eq!(LinearProof::from_slice(&bytes).unwrap(), proof);
    }

    #[test]
    fn single_and_zero_coefficients() {
        let witness = vec![Scalar::from(3_u64), random_scalar().unwrap()];

        let statement_one = statement(vec![Scalar::from(2_u64), Scalar::ZERO], &witness);
        let proof = LinearProof::prove(&statement_one, &witness).unwrap();
        assert!(proof.verify(&statement_one));

        let statement_zero = statement(vec![Scalar::ZERO, Scalar::ZERO], &witness);
        let proof = LinearProof::prove(&statement_zero, &witness).unwrap();
        assert!(proof.verify(&statement_zero));
    }

    #[test]
    fn false_relation_does_not_verify() {
        let witness = vec![Scalar::from(3_u64), Scalar::from(4_u64)];
        let gens = generators(2);
        let image = Point::multi_commit(&gens, &witness).unwrap();
        let statement = LinearStatement::new(
            vec![Scalar::ONE, Scalar::ONE],
            Scalar::from(8_u64),
            image,
            gens,
        )
        .unwrap();
        let proof = LinearProof::prove(&statement, &witness).unwrap();
        assert!(!proof.verify(&statement));
    }

    #[test]
    fn every_corrupted_byte_is_rejected() {
        let witness = vec![
            Scalar::from(9_u64),
            random_scalar().unwrap(),
            -Scalar::from(9_u64),
        ];
        let ones = vec![Scalar::ONE, Scalar::ZERO, Scalar::ONE];
        let statement = statement(ones, &witness);
        let bytes = LinearProof::prove(&statement, &witness).unwrap().to_bytes();
        assert!(LinearProof::from_slice(&bytes).unwrap().verify(&statement));

        for offset in 0..bytes.len() {
            let mut corrupted = bytes.clone();
            corrupted[offset] ^= 0x01;
            if let Ok(proof) = LinearProof::from_slice(&corrupted) {
                assert!(!proof.verify(&statement), "byte {} went unnoticed", offset);
            }
        }
    }

    #[test]
    fn arity_is_checked() {
        let gens = generators(2);
        assert_eq!(
            LinearStatement::new(vec![Scalar::ONE], Scalar::ONE, gens[0], gens.clone())
                .unwrap_err(),
            Error::LengthMismatch(1, 2)
        );

        let witness = vec![Scalar::ONE, Scalar::ONE];
        let statement = statement(vec![Scalar::ONE, Scalar::ONE], &witness);
        assert!(LinearProof::prove(&statement, &witness[..1]).is_err());

        let proof = LinearProof::prove(&statement, &witness).unwrap();
        let mut bytes = proof.to_bytes();
        bytes.truncate(bytes.len() - SCALAR_LEN);
        let short = LinearProof::from_slice(&bytes).unwrap();
        assert!(!short.verify(&statement));
        assert!(LinearProof::from_slice(&bytes[..POINT_LEN + 5]).is_err());
    }
}
