//! Deterministic bag-of-words embeddings built with feature hashing.
//!
//! [`HashingEmbeddingProvider`] needs no model files and no network, which
//! makes it the default embedder for the in-memory store. Each lowercase
//! alphanumeric token is hashed (64-bit FNV-1a) into one of `dimensions`
//! buckets with a hash-derived sign, and the result is L2-normalised so that
//! cosine similarity reduces to a dot product. Texts that share words score
//! higher than texts that do not.

use async_trait::async_trait;

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// Default number of hash buckets.
pub const DEFAULT_DIMENSIONS: usize = 256;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Feature-hashing embedding provider.
///
/// # Example
///
/// ```rust,ignore
/// use flora_rag::{EmbeddingProvider, HashingEmbeddingProvider};
///
/// let provider = HashingEmbeddingProvider::new(64);
/// let embedding = provider.embed("a red cat").await?;
/// assert_eq!(embedding.len(), 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingEmbeddingProvider {
    dimensions: usize,
}

impl HashingEmbeddingProvider {
    /// Create a provider producing vectors with `dimensions` components.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl Default for HashingEmbeddingProvider {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, b| (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME))
}

/// Split text into lowercase alphanumeric tokens.
fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

#[async_trait]
impl EmbeddingProvider for HashingEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.dimensions == 0 {
            return Err(RagError::EmbeddingError {
                provider: self.name().to_string(),
                message: "dimensions must be greater than zero".to_string(),
            });
        }

        let mut embedding = vec![0.0f32; self.dimensions];
        for token in tokens(text) {
            let hash = fnv1a(token.as_bytes());
            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            embedding[bucket] += sign;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            embedding.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn embeddings_are_deterministic_and_normalised() {
        let provider = HashingEmbeddingProvider::new(64);
        let a = provider.embed("A red cat").await.unwrap();
        let b = provider.embed("a RED cat!").await.unwrap();
        assert_eq!(a, b);
        assert!((dot(&a, &a) - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn empty_text_embeds_to_zero_vector() {
        let provider = HashingEmbeddingProvider::new(8);
        let embedding = provider.embed("   ").await.unwrap();
        assert_eq!(embedding, vec![0.0; 8]);
    }

    #[tokio::test]
    async fn shared_words_score_higher() {
        let provider = HashingEmbeddingProvider::default();
        let query = provider.embed("What did you have for dinner?").await.unwrap();
        let same = provider.embed("What did you have for dinner?").await.unwrap();
        let other = provider.embed("How are you?").await.unwrap();
        assert!(dot(&query, &same) > dot(&query, &other));
    }

    #[tokio::test]
    async fn zero_dimensions_is_an_error() {
        let provider = HashingEmbeddingProvider::new(0);
        let err = provider.embed("anything").await.unwrap_err();
        assert!(matches!(err, RagError::EmbeddingError { .. }));
    }
}
