//! Scenarios and artifact handling behind the `forge` command line.

use std::fs::File;
use std::path::{Path, PathBuf};

use ark_bn254::{Bn254, Fr};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use clap::ValueEnum;
use eyre::{eyre, Result, WrapErr};
use forge_core::{
    circuits::{CubicCircuit, ExponentiateCircuit, MerkleCircuit, PreimageCircuit},
    gadgets::{merkle::MerkleTree, mimc::MiMC},
    groth16::{self, Proof, ProvingKey, VerifyingKey},
    r1cs::{system::R1CSStats, Assignment, Circuit, CompiledCircuit},
};
use rand_chacha::ChaCha20Rng;

pub const PROVING_KEY_FILE: &str = "pk.bin";
pub const VERIFYING_KEY_FILE: &str = "vk.bin";
pub const PROOF_FILE: &str = "proof.bin";
pub const PUBLIC_INPUTS_FILE: &str = "public.bin";

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CircuitKind {
    /// x³ + x + 5 = y
    Cubic,
    /// y = x^e with an 8-bit exponent
    Exponentiate,
    /// MiMC preimage of a public hash
    Preimage,
    /// Membership in a MiMC Merkle tree
    Merkle,
}

/// A compiled circuit together with the inputs it is exercised with.
pub struct Scenario {
    pub kind: CircuitKind,
    pub compiled: CompiledCircuit<Fr>,
    pub assignment: Assignment<Fr>,
}

impl Scenario {
    pub fn new(kind: CircuitKind) -> Result<Self> {
        let (compiled, assignment) = match kind {
            CircuitKind::Cubic => (
                compile(&CubicCircuit)?,
                CubicCircuit::assignment(Fr::from(3u64)),
            ),
            CircuitKind::Exponentiate => {
                let circuit = ExponentiateCircuit::default();
                (
                    compile(&circuit)?,
                    ExponentiateCircuit::assignment(Fr::from(3u64), 10),
                )
            }
            CircuitKind::Preimage => {
                let circuit = PreimageCircuit::new(MiMC::default());
                let assignment = circuit.assignment_from_bytes(&[0x01, 0x02, 0x03])?;
                (compile(&circuit)?, assignment)
            }
            CircuitKind::Merkle => {
                let hasher = MiMC::<Fr>::default();
                let leaves = (0..10u8)
                    .map(|i| hasher.hash_bytes(format!("segment-{i}").as_bytes()))
                    .collect();
                let tree = MerkleTree::new(hasher.clone(), leaves)?;
                let opening = tree.proof(5)?;
                let circuit = MerkleCircuit::for_proof(hasher, &opening);
                let assignment = circuit.assignment(tree.root(), &opening)?;
                (compile(&circuit)?, assignment)
            }
        };
        Ok(Self {
            kind,
            compiled,
            assignment,
        })
    }

    pub fn stats(&self) -> R1CSStats {
        self.compiled.r1cs().stats()
    }

    pub fn public_inputs(&self) -> Result<Vec<Fr>> {
        Ok(self.compiled.public_witness(&self.assignment)?.0)
    }

    pub fn setup(
        &self,
        rng: &mut ChaCha20Rng,
    ) -> Result<(ProvingKey<Bn254>, VerifyingKey<Bn254>)> {
        Ok(groth16::setup::<Bn254, _>(self.compiled.r1cs(), rng)?)
    }

    pub fn prove(&self, pk: &ProvingKey<Bn254>, rng: &mut ChaCha20Rng) -> Result<Proof<Bn254>> {
        let witness = self.compiled.solve(&self.assignment)?;
        self.compiled
            .r1cs()
            .is_satisfied(&witness)
            .wrap_err("scenario inputs do not satisfy the circuit")?;
        Ok(groth16::prove(pk, self.compiled.r1cs(), &witness, rng)?)
    }

    /// Compile → setup → prove → verify in one go.
    #[tracing::instrument(skip_all, name = "Scenario::run", fields(circuit = ?self.kind))]
    pub fn run(&self, rng: &mut ChaCha20Rng) -> Result<()> {
        let (pk, vk) = self.setup(rng)?;
        let proof = self.prove(&pk, rng)?;
        groth16::ensure_valid(&vk, &self.public_inputs()?, &proof)?;
        tracing::info!("verification succeeded");
        Ok(())
    }

    pub fn write_keys(&self, dir: &Path, rng: &mut ChaCha20Rng) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let (pk, vk) = self.setup(rng)?;
        write_artifact("Proving key", &dir.join(PROVING_KEY_FILE), &pk)?;
        write_artifact("Verifying key", &dir.join(VERIFYING_KEY_FILE), &vk)
    }

    pub fn write_proof(&self, dir: &Path, rng: &mut ChaCha20Rng) -> Result<()> {
        let pk: ProvingKey<Bn254> = read_artifact(&dir.join(PROVING_KEY_FILE))?;
        let proof = self.prove(&pk, rng)?;
        write_artifact("Proof", &dir.join(PROOF_FILE), &proof)?;
        write_artifact(
            "Public inputs",
            &dir.join(PUBLIC_INPUTS_FILE),
            &self.public_inputs()?,
        )
    }

    /// Checks the stored proof against the stored public inputs.
    pub fn verify_stored(&self, dir: &Path) -> Result<()> {
        let vk: VerifyingKey<Bn254> = read_artifact(&dir.join(VERIFYING_KEY_FILE))?;
        let expected = self.compiled.r1cs().num_public_inputs;
        if vk.num_public_inputs() != expected {
            return Err(eyre!(
                "verifying key expects {} public inputs, {:?} has {expected}",
                vk.num_public_inputs(),
                self.kind
            ));
        }
        let proof: Proof<Bn254> = read_artifact(&dir.join(PROOF_FILE))?;
        let public: Vec<Fr> = read_artifact(&dir.join(PUBLIC_INPUTS_FILE))?;
        groth16::ensure_valid(&vk, &public, &proof)?;
        tracing::info!("verification succeeded");
        Ok(())
    }
}

fn compile<C: Circuit<Fr>>(circuit: &C) -> Result<CompiledCircuit<Fr>> {
    Ok(CompiledCircuit::compile(circuit)?)
}

pub fn write_artifact(
    item_name: &str,
    path: &Path,
    item: &impl CanonicalSerialize,
) -> Result<()> {
    let mut file = File::create(path).wrap_err_with(|| format!("creating {}", path.display()))?;
    item.serialize_compressed(&mut file)?;
    let file_size_kb = file.metadata()?.len() as f64 / 1024.0;
    tracing::info!("{item_name} written to {}", path.display());
    tracing::info!("{item_name} size: {file_size_kb:.1} kB");
    Ok(())
}

pub fn read_artifact<T: CanonicalDeserialize>(path: &Path) -> Result<T> {
    let file = File::open(path).wrap_err_with(|| format!("opening {}", path.display()))?;
    T::deserialize_compressed(file).map_err(|err| eyre!("decoding {}: {err}", path.display()))
}

pub fn default_artifact_dir() -> PathBuf {
    PathBuf::from("forge-artifacts")
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn every_scenario_verifies() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        for kind in CircuitKind::value_variants() {
            Scenario::new(*kind).unwrap().run(&mut rng).unwrap();
        }
    }

    #[test]
    fn stored_artifacts_verify() {
        let mut rng = ChaCha20Rng::seed_from_u64(6);
        let dir = std::env::temp_dir().join(format!("forge-test-{}", std::process::id()));
        let scenario = Scenario::new(CircuitKind::Cubic).unwrap();
        scenario.write_keys(&dir, &mut rng).unwrap();
        scenario.write_proof(&dir, &mut rng).unwrap();
        scenario.verify_stored(&dir).unwrap();

        let wrong = vec![Fr::from(36u64)];
        write_artifact("Public inputs", &dir.join(PUBLIC_INPUTS_FILE), &wrong).unwrap();
        assert!(scenario.verify_stored(&dir).is_err());
        assert!(Scenario::new(CircuitKind::Exponentiate)
            .unwrap()
            .verify_stored(&dir)
            .is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
