use super::mimc::MiMC;
use crate::{
    field::CircuitField,
    r1cs::{CircuitBuilder, LC},
    utils::errors::CircuitError,
};

/// MiMC Merkle tree over field-element leaves. A level with an odd number of nodes promotes its
/// last node unchanged.
#[derive(Clone, Debug)]
pub struct MerkleTree<F: CircuitField> {
    hasher: MiMC<F>,
    leaves: Vec<F>,
    /// `layers[0]` holds the leaf hashes, the last layer holds the root.
    layers: Vec<Vec<F>>,
}

/// Membership proof: `path[0]` is the leaf, `path[1..]` the siblings from the bottom up.
/// `helpers[i]` is `true` when the running hash is the left input at step `i`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleProof<F: CircuitField> {
    pub path: Vec<F>,
    pub helpers: Vec<bool>,
}

impl<F: CircuitField> MerkleTree<F> {
    #[tracing::instrument(skip_all, name = "MerkleTree::new", fields(leaves = leaves.len()))]
    pub fn new(hasher: MiMC<F>, leaves: Vec<F>) -> Result<Self, CircuitError> {
        if leaves.is_empty() {
            return Err(CircuitError::InvalidCircuitState(
                "a Merkle tree needs at least one leaf".to_string(),
            ));
        }
        let mut layers: Vec<Vec<F>> = vec![leaves.iter().map(|leaf| hasher.hash(&[*leaf])).collect()];
        while let Some(layer) = layers.last().filter(|layer| layer.len() > 1) {
            let next = layer
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hasher.hash(&[*left, *right]),
                    _ => pair[0],
                })
                .collect();
            layers.push(next);
        }
        Ok(Self {
            hasher,
            leaves,
            layers,
        })
    }

    pub fn root(&self) -> F {
        self.layers[self.layers.len() - 1][0]
    }

    pub fn leaves(&self) -> &[F] {
        &self.leaves
    }

    /// Number of hashing levels above the leaves.
    pub fn height(&self) -> usize {
        self.layers.len() - 1
    }

    pub fn proof(&self, index: usize) -> Result<MerkleProof<F>, CircuitError> {
        let leaf = *self.leaves.get(index).ok_or_else(|| {
            CircuitError::InvalidCircuitState(format!(
                "leaf {index} out of range for {} leaves",
                self.leaves.len()
            ))
        })?;
        let mut path = vec![leaf];
        let mut helpers = vec![];
        let mut idx = index;
        for layer in &self.layers[..self.height()] {
            if idx % 2 == 1 {
                path.push(layer[idx - 1]);
                helpers.push(false);
            } else if let Some(sibling) = layer.get(idx + 1) {
                path.push(*sibling);
                helpers.push(true);
            }
            idx /= 2;
        }
        Ok(MerkleProof { path, helpers })
    }

    pub fn hasher(&self) -> &MiMC<F> {
        &self.hasher
    }
}

impl<F: CircuitField> MerkleProof<F> {
    pub fn verify(&self, hasher: &MiMC<F>, root: F) -> bool {
        let Some((leaf, siblings)) = self.path.split_first() else {
            return false;
        };
        if siblings.len() != self.helpers.len() {
            return false;
        }
        let sum = siblings
            .iter()
            .zip(&self.helpers)
            .fold(hasher.hash(&[*leaf]), |sum, (sibling, left)| {
                if *left {
                    hasher.hash(&[sum, *sibling])
                } else {
                    hasher.hash(&[*sibling, sum])
                }
            });
        sum == root
    }

    pub fn helper_values(&self) -> Vec<F> {
        self.helpers
            .iter()
            .map(|left| if *left { F::one() } else { F::zero() })
            .collect()
    }
}

/// Asserts that `path` opens to `root`. Each helper is constrained boolean and orders the
/// inputs of the next node hash through `select`.
pub fn verify_proof<F: CircuitField>(
    api: &mut CircuitBuilder<F>,
    hasher: &MiMC<F>,
    root: impl Into<LC<F>>,
    path: &[LC<F>],
    helpers: &[LC<F>],
) -> Result<(), CircuitError> {
    let Some((leaf, siblings)) = path.split_first() else {
        return Err(CircuitError::InvalidCircuitState(
            "Merkle path must contain the leaf".to_string(),
        ));
    };
    if siblings.len() != helpers.len() {
        return Err(CircuitError::InvalidCircuitState(format!(
            "Merkle path has {} siblings but {} helpers",
            siblings.len(),
            helpers.len()
        )));
    }
    let mut sum = hasher.hash_gadget(api, std::slice::from_ref(leaf))?;
    for (sibling, helper) in siblings.iter().zip(helpers) {
        api.assert_is_boolean(helper.clone())?;
        let left = api.select(helper.clone(), sum.clone(), sibling.clone())?;
        let right = api.select(helper.clone(), sibling.clone(), sum)?;
        sum = hasher.hash_gadget(api, &[left.into(), right.into()])?;
    }
    api.assert_is_equal(sum, root)
}

#[cfg(test)]
mod test {
    use super::*;
    use ark_bn254::Fr;

    fn tree(n: u64) -> MerkleTree<Fr> {
        MerkleTree::new(MiMC::default(), (0..n).map(|i| Fr::from(100 + i)).collect()).unwrap()
    }

    #[test]
    fn every_leaf_opens_to_the_root() {
        for n in [1, 2, 5, 8] {
            let tree = tree(n);
            for index in 0..n as usize {
                let proof = tree.proof(index).unwrap();
                assert_eq!(proof.path[0], tree.leaves()[index]);
                assert!(proof.verify(tree.hasher(), tree.root()), "n = {n}, index = {index}");
            }
        }
    }

    #[test]
    fn odd_levels_promote_the_last_node() {
        let tree = tree(5);
        assert_eq!(tree.height(), 3);
        // leaf 4 is promoted twice, then hashed against the left subtree
        let proof = tree.proof(4).unwrap();
        assert_eq!(proof.helpers, vec![false]);
        assert_eq!(tree.proof(1).unwrap().helpers, vec![false, true, true]);
    }

    #[test]
    fn wrong_leaves_and_roots_fail() {
        let tree = tree(4);
        let mut proof = tree.proof(2).unwrap();
        assert!(!proof.verify(tree.hasher(), tree.root() + Fr::from(1u64)));
        proof.path[0] = Fr::from(7u64);
        assert!(!proof.verify(tree.hasher(), tree.root()));
        assert!(tree.proof(4).is_err());
        assert!(MerkleTree::new(MiMC::<Fr>::default(), vec![]).is_err());
    }
}
