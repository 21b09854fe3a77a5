//! Chromosome decoding.
//!
//! A chromosome holds one integer gene per tick. Genes are looked up in a
//! fixed table that maps small non-negative integers to actions.

use std::fmt;

use crate::actions::{Action, ResourceKind};
use crate::error::{Result, SimError};

/// Decode table: the gene value is the index.
pub const GENE_TABLE: [Action; 7] = [
    Action::Noop,
    Action::TrainVillager,
    Action::AssignFood,
    Action::AssignWood,
    Action::IdleOne(ResourceKind::Food),
    Action::IdleOne(ResourceKind::Wood),
    Action::BuildHouse,
];

/// A gene together with the action it decodes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneAction {
    /// Raw gene value.
    pub gene: i32,
    /// Decoded action.
    pub action: Action,
}

impl GeneAction {
    /// Decode a single gene.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownGene`] if the gene has no table entry.
    pub fn decode(gene: i32, tick: usize) -> Result<Self> {
        usize::try_from(gene)
            .ok()
            .and_then(|index| GENE_TABLE.get(index))
            .map(|&action| Self { gene, action })
            .ok_or(SimError::UnknownGene { gene, tick })
    }

    /// Iterate over every table entry in gene order.
    pub fn all() -> impl Iterator<Item = Self> {
        GENE_TABLE.iter().enumerate().map(|(index, &action)| Self {
            gene: index as i32,
            action,
        })
    }
}

impl fmt::Display for GeneAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.gene, self.action)
    }
}

/// Decode a whole chromosome, failing on the first out-of-table gene.
///
/// # Errors
///
/// Returns [`SimError::UnknownGene`] naming the offending value and tick.
pub fn decode_chromosome(chromosome: &[i32]) -> Result<Vec<GeneAction>> {
    chromosome
        .iter()
        .enumerate()
        .map(|(tick, &gene)| GeneAction::decode(gene, tick))
        .collect()
}

/// Parse chromosome text such as `"1, 2, 0 0 6"`.
///
/// Genes may be separated by commas, whitespace, or both. Values are not
/// checked against the decode table here.
///
/// # Errors
///
/// Returns [`SimError::InvalidGeneToken`] for a token that is not an integer.
pub fn parse_chromosome(text: &str) -> Result<Vec<i32>> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(position, token)| {
            token.parse::<i32>().map_err(|_| SimError::InvalidGeneToken {
                token: token.to_string(),
                position,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_table() {
        let names: Vec<String> = GeneAction::all().map(|g| g.action.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "noop",
                "train_villager",
                "assign_food",
                "assign_wood",
                "idle_one/food",
                "idle_one/wood",
                "build_house",
            ]
        );
    }

    #[test]
    fn test_decode_chromosome() {
        let decoded = decode_chromosome(&[1, 2, 5]).unwrap();
        assert_eq!(decoded[0].action, Action::TrainVillager);
        assert_eq!(decoded[2].action, Action::IdleOne(ResourceKind::Wood));
        assert!(decode_chromosome(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_gene_names_value_and_tick() {
        assert_eq!(
            decode_chromosome(&[0, 1, 7, -1]),
            Err(SimError::UnknownGene { gene: 7, tick: 2 })
        );
        assert_eq!(
            decode_chromosome(&[-3]),
            Err(SimError::UnknownGene { gene: -3, tick: 0 })
        );
    }

    #[test]
    fn test_parse_chromosome() {
        assert_eq!(parse_chromosome("1,2,0").unwrap(), vec![1, 2, 0]);
        assert_eq!(parse_chromosome(" 1, 2  0\n6 ").unwrap(), vec![1, 2, 0, 6]);
        assert!(parse_chromosome("").unwrap().is_empty());
        assert_eq!(
            parse_chromosome("1,x,2"),
            Err(SimError::InvalidGeneToken {
                token: "x".to_string(),
                position: 1
            })
        );
    }

    #[test]
    fn test_gene_action_display() {
        let gene = GeneAction::decode(4, 0).unwrap();
        assert_eq!(gene.to_string(), "4 = idle_one/food");
    }
}
