//! The set of factors found for one game.

use std::collections::HashMap;

use log::debug;

use crate::bitset::BitSet;
use crate::error::RegistryError;
use crate::factor::{Factor, FactorBuilder};
use crate::network::CompiledNetwork;
use crate::types::{FactorId, PropId};

/// Allocates factor ids and manages a whole partitioning at once.
#[derive(Debug, Default)]
pub struct FactorRegistry {
    next_id: u32,
}

impl FactorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ids handed out so far.
    pub fn num_allocated(&self) -> usize {
        self.next_id as usize
    }

    fn allocate(&mut self) -> FactorId {
        let id = FactorId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Start a new, empty factor with a fresh id.
    pub fn new_factor(&mut self) -> FactorBuilder {
        let id = self.allocate();
        debug!("new_factor: {}", id);
        FactorBuilder::new(id)
    }

    /// Seal every builder against `network`.
    ///
    /// Ownership must already be recorded on the network for all builders (see
    /// [`FactorBuilder::claim`]), otherwise masks sealed early miss propositions claimed later.
    pub fn seal_all(&self, builders: Vec<FactorBuilder>, network: &impl CompiledNetwork) -> Vec<Factor> {
        debug!("seal_all: {} factors", builders.len());
        builders.into_iter().map(|b| b.complete(network)).collect()
    }

    /// Check that no proposition belongs to more than one factor, both in the claimed
    /// components and in the sealed factor-specific masks.
    pub fn check_disjoint(&self, factors: &[Factor]) -> Result<(), RegistryError> {
        let mut owners: HashMap<PropId, FactorId> = HashMap::new();
        for factor in factors {
            for &prop in factor.components() {
                claim_once(&mut owners, prop, factor.id())?;
            }
        }

        let mut owners: HashMap<PropId, FactorId> = HashMap::new();
        for factor in factors {
            for prop in mask_props(factor.state_mask(true)) {
                claim_once(&mut owners, prop, factor.id())?;
            }
        }
        Ok(())
    }

    /// Save every factor, one per line.
    pub fn save(&self, factors: &[Factor], network: &impl CompiledNetwork) -> String {
        let mut out = String::new();
        for factor in factors {
            out.push_str(&factor.to_persistent_string(network));
            out.push('\n');
        }
        out
    }

    /// Load factors saved by [`save`](Self::save), giving each a fresh id.
    ///
    /// Blank lines are skipped. The first malformed line aborts the load; ids are only
    /// consumed by lines that parse.
    pub fn load(&mut self, text: &str, network: &impl CompiledNetwork) -> Result<Vec<FactorBuilder>, RegistryError> {
        let mut builders = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let id = FactorId::new(self.next_id);
            let builder =
                FactorBuilder::from_persistent_string(id, line, network.base_propositions(), network.move_infos())
                    .map_err(|source| RegistryError::Parse { line: i + 1, source })?;
            self.next_id += 1;
            builders.push(builder);
        }
        debug!("load: {} factors", builders.len());
        Ok(builders)
    }
}

fn claim_once(owners: &mut HashMap<PropId, FactorId>, prop: PropId, factor: FactorId) -> Result<(), RegistryError> {
    match owners.insert(prop, factor) {
        Some(first) if first != factor => Err(RegistryError::Overlap {
            prop,
            first,
            second: factor,
        }),
        _ => Ok(()),
    }
}

fn mask_props(mask: &BitSet) -> impl Iterator<Item = PropId> + '_ {
    mask.iter().map(|i| PropId::new(i as u32))
}
