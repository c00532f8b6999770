use crate::engines::generation::transient::TransientSet;
use crate::engines::generation::tree::ExpressionTree;
use crate::error::{Result, TtgpError};
use crate::types::Node;

/// Executable form of a tree with every transient reference inlined
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    nodes: Vec<Node>,
}

/// Resolves transient references against the current set. A key that is no
/// longer present resolves to the constant 0.0.
pub fn compile(tree: &ExpressionTree, transient: &TransientSet) -> Result<Program> {
    if !tree.is_well_formed() {
        return Err(TtgpError::Evaluation(format!("malformed tree: {}", tree)));
    }

    Ok(Program {
        nodes: transient.resolve(tree.nodes()),
    })
}

impl Program {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Evaluates the program on one feature vector
    pub fn predict(&self, row: &[f64]) -> Result<f64> {
        let mut stack: Vec<f64> = Vec::with_capacity(self.nodes.len());

        for node in self.nodes.iter().rev() {
            let value = match node {
                Node::Feature(i) => *row.get(*i).ok_or_else(|| {
                    TtgpError::VocabularyContract(format!(
                        "feature x{} requested from a row of {} values",
                        i,
                        row.len()
                    ))
                })?,
                Node::Constant(c) => *c,
                Node::Unary(op) => op.apply(pop(&mut stack)?),
                Node::Binary(op) => {
                    let lhs = pop(&mut stack)?;
                    let rhs = pop(&mut stack)?;
                    op.apply(lhs, rhs)
                }
                Node::Transient(key) => {
                    return Err(TtgpError::Evaluation(format!("unresolved transient {}", key)))
                }
            };
            stack.push(value);
        }

        match (stack.pop(), stack.is_empty()) {
            (Some(value), true) => Ok(value),
            _ => Err(TtgpError::Evaluation("program left an unbalanced stack".to_string())),
        }
    }

    pub fn predict_all(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        rows.iter().map(|row| self.predict(row)).collect()
    }
}

fn pop(stack: &mut Vec<f64>) -> Result<f64> {
    stack
        .pop()
        .ok_or_else(|| TtgpError::Evaluation("missing operand".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::generation::transient::FrequencyScorer;
    use crate::functions::primitives::BinaryOp;
    use crate::types::TransientKey;

    fn empty_set() -> TransientSet {
        TransientSet::new(2, 3, Box::new(FrequencyScorer))
    }

    #[test]
    fn test_operand_order() {
        // sub(x0, x1)
        let tree = ExpressionTree::new(vec![
            Node::Binary(BinaryOp::Sub),
            Node::Feature(0),
            Node::Feature(1),
        ]);
        let program = compile(&tree, &empty_set()).unwrap();
        assert_eq!(program.predict(&[5.0, 2.0]).unwrap(), 3.0);
    }

    #[test]
    fn test_transient_inlined_and_dangling_zeroed() {
        let mut set = empty_set();
        let key = set
            .insert(&[Node::Binary(BinaryOp::Mul), Node::Feature(0), Node::Feature(0)], 0)
            .unwrap();

        // add(T_live, T_missing)
        let tree = ExpressionTree::new(vec![
            Node::Binary(BinaryOp::Add),
            Node::Transient(key),
            Node::Transient(TransientKey(99)),
        ]);
        let program = compile(&tree, &set).unwrap();
        assert_eq!(program.predict(&[3.0]).unwrap(), 9.0);
    }

    #[test]
    fn test_malformed_tree_is_evaluation_error() {
        let tree = ExpressionTree::new(vec![Node::Binary(BinaryOp::Add), Node::Feature(0)]);
        let err = compile(&tree, &empty_set()).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_missing_feature_is_contract_violation() {
        let tree = ExpressionTree::new(vec![Node::Feature(4)]);
        let program = compile(&tree, &empty_set()).unwrap();
        assert!(matches!(program.predict(&[1.0]), Err(TtgpError::VocabularyContract(_))));
    }
}
