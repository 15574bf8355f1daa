use rulinalg::matrix::{BaseMatrix, Matrix};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// A matrix with its weights stored as raw bits, so a saved network reloads bit for bit
#[derive(Serialize, Deserialize)]
struct Layer {
    rows: usize,
    cols: usize,
    bits: Vec<u64>,
}

pub fn serialize_layers<S: Serializer>(
    layers: &[Matrix<f64>],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    layers
        .iter()
        .map(|m| Layer {
            rows: m.rows(),
            cols: m.cols(),
            bits: m.data().iter().map(|&f| f64::to_bits(f)).collect(),
        })
        .collect::<Vec<_>>()
        .serialize(serializer)
}

pub fn deserialize_layers<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<Matrix<f64>>, D::Error> {
    Vec::<Layer>::deserialize(deserializer)?
        .into_iter()
        .map(|Layer { rows, cols, bits }| {
            if rows * cols != bits.len() {
                return Err(de::Error::custom(format!(
                    "{rows}x{cols} layer holds {} weights",
                    bits.len()
                )));
            }
            Ok(Matrix::new(
                rows,
                cols,
                bits.into_iter().map(f64::from_bits).collect::<Vec<_>>(),
            ))
        })
        .collect()
}

/// Weights as raw bits, for the same reason as [serialize_layers]
pub fn serialize_weights<S: Serializer>(weights: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
    weights
        .iter()
        .map(|&f| f64::to_bits(f))
        .collect::<Vec<_>>()
        .serialize(serializer)
}

pub fn deserialize_weights<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
    Ok(Vec::<u64>::deserialize(deserializer)?
        .into_iter()
        .map(f64::from_bits)
        .collect())
}
