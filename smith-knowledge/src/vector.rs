//! Vector arithmetic over embedding vectors.
//!
//! Components are stored as `f32`; products are accumulated in `f64`.

use crate::errors::{KnowledgeError, KnowledgeResult};

fn check(a: &[f32], b: &[f32]) -> KnowledgeResult<()> {
    if a.len() != b.len() {
        return Err(KnowledgeError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    if a.is_empty() {
        return Err(KnowledgeError::EmptyVector);
    }
    Ok(())
}

/// Inner product. This is the ranking score.
pub fn dot(a: &[f32], b: &[f32]) -> KnowledgeResult<f64> {
    check(a, b)?;
    Ok(a.iter()
        .zip(b)
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum())
}

/// Euclidean length.
pub fn norm(a: &[f32]) -> KnowledgeResult<f64> {
    Ok(dot(a, a)?.sqrt())
}

/// Cosine similarity. Zero-length vectors compare as 0.
pub fn cosine(a: &[f32], b: &[f32]) -> KnowledgeResult<f64> {
    let product = dot(a, b)?;
    let lengths = norm(a)? * norm(b)?;
    if lengths == 0.0 {
        return Ok(0.0);
    }
    Ok(product / lengths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_and_norm() {
        assert_eq!(dot(&[1.0, 2.0, 2.0], &[1.0, 2.0, 2.0]).unwrap(), 9.0);
        assert_eq!(norm(&[3.0, 4.0]).unwrap(), 5.0);
        assert_eq!(dot(&[1.0, -1.0], &[2.0, 3.0]).unwrap(), -1.0);
    }

    #[test]
    fn test_cosine() {
        let c = cosine(&[1.0, 0.0], &[2.0, 0.0]).unwrap();
        assert!((c - 1.0).abs() < 1e-12);
        assert_eq!(cosine(&[1.0, 0.0], &[0.0, 5.0]).unwrap(), 0.0);
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 1.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_dimension_errors() {
        assert!(matches!(
            dot(&[1.0], &[1.0, 2.0]),
            Err(KnowledgeError::DimensionMismatch {
                expected: 1,
                actual: 2
            })
        ));
        assert!(matches!(dot(&[], &[]), Err(KnowledgeError::EmptyVector)));
    }
}
