use ark_bn254::{Bn254, Fr};
use ark_ff::{BigInteger, PrimeField};
use forge_core::{
    circuits::{CubicCircuit, ExponentiateCircuit, MerkleCircuit, PreimageCircuit},
    gadgets::{merkle::MerkleTree, mimc::MiMC},
    groth16::{self, ByteEncoding, Proof, ProvingKey, VerifyingKey},
    r1cs::{Assignment, Circuit, CircuitBuilder, CompiledCircuit, Witness},
    utils::errors::{CircuitError, Groth16Error},
};
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;

fn rng() -> ChaCha20Rng {
    ChaCha20Rng::from_seed([11; 32])
}

struct Pipeline {
    compiled: CompiledCircuit<Fr>,
    pk: ProvingKey<Bn254>,
    vk: VerifyingKey<Bn254>,
}

impl Pipeline {
    fn new<C: Circuit<Fr>>(circuit: &C, rng: &mut ChaCha20Rng) -> Self {
        let compiled = CompiledCircuit::compile(circuit).unwrap();
        let (pk, vk) = groth16::setup::<Bn254, _>(compiled.r1cs(), rng).unwrap();
        Self { compiled, pk, vk }
    }

    fn prove(&self, assignment: &Assignment<Fr>, rng: &mut ChaCha20Rng) -> Proof<Bn254> {
        let witness = self.compiled.solve(assignment).unwrap();
        groth16::prove(&self.pk, self.compiled.r1cs(), &witness, rng).unwrap()
    }

    fn public(&self, assignment: &Assignment<Fr>) -> Vec<Fr> {
        self.compiled.public_witness(assignment).unwrap().0
    }
}

#[test]
fn cubic_relation() {
    let mut rng = rng();
    let pipeline = Pipeline::new(&CubicCircuit, &mut rng);
    let assignment = CubicCircuit::assignment(Fr::from(3u64));
    let proof = pipeline.prove(&assignment, &mut rng);
    assert_eq!(pipeline.public(&assignment), vec![Fr::from(35u64)]);
    assert!(groth16::verify(&pipeline.vk, &[Fr::from(35u64)], &proof).unwrap());
}

#[test]
fn exponentiation() {
    let mut rng = rng();
    let pipeline = Pipeline::new(&ExponentiateCircuit::default(), &mut rng);
    let assignment = ExponentiateCircuit::assignment(Fr::from(3u64), 10);
    let proof = pipeline.prove(&assignment, &mut rng);
    let public = [Fr::from(3u64), Fr::from(59049u64)];
    assert_eq!(pipeline.public(&assignment), public);
    assert!(groth16::verify(&pipeline.vk, &public, &proof).unwrap());
    let wrong = [Fr::from(3u64), Fr::from(59050u64)];
    assert!(!groth16::verify(&pipeline.vk, &wrong, &proof).unwrap());
}

#[test]
fn hash_preimage() {
    let mut rng = rng();
    let preimage = [0x01u8, 0x02, 0x03];
    let hash = MiMC::<Fr>::default().hash_bytes(&preimage);

    let circuit = PreimageCircuit::<Fr>::default();
    let pipeline = Pipeline::new(&circuit, &mut rng);
    let assignment = circuit.assignment_from_bytes(&preimage).unwrap();
    let proof = pipeline.prove(&assignment, &mut rng);
    assert!(groth16::verify(&pipeline.vk, &[hash], &proof).unwrap());
}

#[test]
fn merkle_membership() {
    let mut rng = rng();
    let leaves: Vec<Fr> = (0..10u64).map(|i| Fr::from(1000 + i)).collect();
    let tree = MerkleTree::new(MiMC::default(), leaves).unwrap();
    let opening = tree.proof(5).unwrap();

    let circuit = MerkleCircuit::for_proof(MiMC::default(), &opening);
    let pipeline = Pipeline::new(&circuit, &mut rng);
    let assignment = circuit.assignment(tree.root(), &opening).unwrap();
    let proof = pipeline.prove(&assignment, &mut rng);
    assert!(groth16::verify(&pipeline.vk, &[tree.root()], &proof).unwrap());
    assert!(!groth16::verify(&pipeline.vk, &[tree.leaves()[5]], &proof).unwrap());
}

#[test]
fn tampered_witness_is_never_proven() {
    let mut rng = rng();
    let pipeline = Pipeline::new(&CubicCircuit, &mut rng);
    let witness = pipeline
        .compiled
        .solve(&CubicCircuit::assignment(Fr::from(3u64)))
        .unwrap();

    let mut values = witness.values().to_vec();
    let y = pipeline.compiled.column_of("y").unwrap();
    values[y] = Fr::from(36u64);
    let tampered = Witness::new(values, pipeline.compiled.r1cs().num_public_inputs).unwrap();

    assert!(matches!(
        groth16::prove(&pipeline.pk, pipeline.compiled.r1cs(), &tampered, &mut rng),
        Err(Groth16Error::WitnessConstraintViolation { .. })
    ));
}

#[test]
fn wrong_public_input_is_rejected() {
    let mut rng = rng();
    let pipeline = Pipeline::new(&CubicCircuit, &mut rng);
    let proof = pipeline.prove(&CubicCircuit::assignment(Fr::from(3u64)), &mut rng);
    assert!(!groth16::verify(&pipeline.vk, &[Fr::from(36u64)], &proof).unwrap());
    assert!(matches!(
        groth16::ensure_valid(&pipeline.vk, &[Fr::from(36u64)], &proof),
        Err(Groth16Error::VerificationFailed)
    ));
}

#[test]
fn single_bit_flips_are_rejected() {
    let mut rng = rng();
    let pipeline = Pipeline::new(&CubicCircuit, &mut rng);
    let proof = pipeline.prove(&CubicCircuit::assignment(Fr::from(3u64)), &mut rng);
    let pvk = groth16::prepare_verifying_key(pipeline.vk.clone());
    let public = Fr::from(35u64);

    let bytes = proof.to_bytes().unwrap();
    for index in 0..bytes.len() {
        for bit in 0..8 {
            let mut flipped = bytes.clone();
            flipped[index] ^= 1 << bit;
            // Bytes that no longer decode to curve points count as rejected.
            if let Ok(tampered) = Proof::<Bn254>::from_bytes(&flipped) {
                assert!(
                    !groth16::verify_with_prepared(&pvk, &[public], &tampered).unwrap(),
                    "flip of bit {bit} in byte {index} was accepted"
                );
            }
        }
    }

    let bits = public.into_bigint().to_bits_le();
    for position in 0..bits.len() {
        let mut flipped = bits.clone();
        flipped[position] = !flipped[position];
        // Flips that land at or above the modulus are not field elements.
        if let Some(tampered) = Fr::from_bigint(BigInteger::from_bits_le(&flipped)) {
            assert!(
                !groth16::verify_with_prepared(&pvk, &[tampered], &proof).unwrap(),
                "flip of public input bit {position} was accepted"
            );
        }
    }
}

#[test]
fn compilation_is_deterministic() {
    let circuit = ExponentiateCircuit::default();
    let first = CompiledCircuit::<Fr>::compile(&circuit).unwrap();
    let second = CompiledCircuit::<Fr>::compile(&circuit).unwrap();
    assert_eq!(first.r1cs(), second.r1cs());
    assert_eq!(first.layout(), second.layout());
    assert_eq!(
        first.r1cs().shape_digest().unwrap(),
        second.r1cs().shape_digest().unwrap()
    );
}

struct Decompose {
    bits: usize,
}

impl Circuit<Fr> for Decompose {
    fn define(&self, api: &mut CircuitBuilder<Fr>) -> Result<(), CircuitError> {
        let x = api.secret_input("x")?;
        let packed = api.public_input("packed")?;
        let bits = api.to_binary(x, self.bits)?;
        let repacked = api.from_binary(&bits);
        api.assert_is_equal(repacked, packed)
    }
}

#[test]
fn to_binary_boundaries() {
    let compiled = CompiledCircuit::compile(&Decompose { bits: 8 }).unwrap();
    let fits = Assignment::new()
        .with("x", Fr::from(0b1011_0110u64))
        .with("packed", Fr::from(0b1011_0110u64));
    let witness = compiled.solve(&fits).unwrap();
    assert!(compiled.r1cs().is_satisfied(&witness).is_ok());

    // 0x1b6 truncates to its low byte 0xb6; the packing row then fails.
    let too_wide = Assignment::new()
        .with("x", Fr::from(0x1b6u64))
        .with("packed", Fr::from(0xb6u64));
    let witness = compiled.solve(&too_wide).unwrap();
    assert!(matches!(
        compiled.r1cs().is_satisfied(&witness),
        Err(CircuitError::UnsatisfiedConstraint { row: 8 })
    ));

    assert!(CompiledCircuit::compile(&Decompose { bits: 253 }).is_ok());
    assert!(matches!(
        CompiledCircuit::compile(&Decompose { bits: 254 }),
        Err(CircuitError::InvalidBitWidth {
            requested: 254,
            max: 253
        })
    ));
}
