//! Artifact formats: how typed values are encoded into file contents.
//!
//! Every format only has to provide an encode/decode pair with
//! `decode(encode(v)) == v`. Domain objects the core does not know about
//! (z-matrices, reaction graphs, trajectories) go through [`Json`], or
//! through a caller-provided `Artifact` implementation.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::format::Format;

/// A value that can be persisted as a single artifact file.
pub trait Artifact: Sized {
    /// The format tag artifacts of this type are registered under.
    const FORMAT: Format;

    /// Encode the value as file contents.
    fn encode(&self) -> Result<String>;

    /// Decode file contents. Errors carry the format and a message; the
    /// caller adds the path.
    fn decode(text: &str) -> std::result::Result<Self, String>;

    /// Lightweight structural check used by `exists`.
    fn check(text: &str) -> bool {
        !text.trim().is_empty()
    }
}

/// Plain text, stored verbatim.
impl Artifact for String {
    const FORMAT: Format = Format::TEXT;

    fn encode(&self) -> Result<String> {
        Ok(self.clone())
    }

    fn decode(text: &str) -> std::result::Result<Self, String> {
        Ok(text.to_string())
    }

    /// Any content counts, including whitespace; only an empty file does not.
    fn check(text: &str) -> bool {
        !text.is_empty()
    }
}

/// A single number. `Display` for `f64` prints the shortest representation
/// that parses back to the same value, so the round trip is exact.
impl Artifact for f64 {
    const FORMAT: Format = Format::SCALAR;

    fn encode(&self) -> Result<String> {
        if !self.is_finite() {
            return Err(Error::Serialization {
                format: Self::FORMAT,
                message: format!("non-finite scalar {}", self),
            });
        }
        Ok(format!("{}\n", self))
    }

    fn decode(text: &str) -> std::result::Result<Self, String> {
        text.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid scalar '{}': {}", text.trim(), e))
    }

    fn check(text: &str) -> bool {
        Self::decode(text).is_ok()
    }
}

/// A dense numeric matrix, one whitespace-separated row per line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Matrix {
    pub rows: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn new(rows: Vec<Vec<f64>>) -> Self {
        Matrix { rows }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.rows.first().map_or(0, Vec::len))
    }
}

impl Artifact for Matrix {
    const FORMAT: Format = Format::MATRIX;

    fn encode(&self) -> Result<String> {
        let (_, ncols) = self.shape();
        let mut out = String::new();
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != ncols {
                return Err(Error::Serialization {
                    format: Self::FORMAT,
                    message: format!("row {} has {} columns, expected {}", i, row.len(), ncols),
                });
            }
            if let Some(bad) = row.iter().find(|v| !v.is_finite()) {
                return Err(Error::Serialization {
                    format: Self::FORMAT,
                    message: format!("non-finite entry {} in row {}", bad, i),
                });
            }
            let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            out.push_str(&line.join(" "));
            out.push('\n');
        }
        Ok(out)
    }

    fn decode(text: &str) -> std::result::Result<Self, String> {
        let rows = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(i, line)| {
                line.split_whitespace()
                    .map(|v| {
                        v.parse::<f64>()
                            .map_err(|e| format!("row {}: invalid entry '{}': {}", i, v, e))
                    })
                    .collect::<std::result::Result<Vec<f64>, String>>()
            })
            .collect::<std::result::Result<Vec<_>, String>>()?;

        let matrix = Matrix { rows };
        let (_, ncols) = matrix.shape();
        if matrix.rows.iter().any(|row| row.len() != ncols) {
            return Err("ragged rows".to_string());
        }
        Ok(matrix)
    }
}

/// Wrapper persisting any serde type as a JSON document.
///
/// # Example
///
/// ```rust
/// use locfs_core::{Artifact, Json};
///
/// let traj = Json(vec![("H".to_string(), [0.0, 0.0, 0.0])]);
/// let text = traj.encode().unwrap();
/// let back: Json<Vec<(String, [f64; 3])>> = Json::decode(&text).unwrap();
/// assert_eq!(back, traj);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Serialize + DeserializeOwned> Artifact for Json<T> {
    const FORMAT: Format = Format::JSON;

    fn encode(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.0).map_err(|e| Error::Serialization {
            format: Self::FORMAT,
            message: e.to_string(),
        })
    }

    fn decode(text: &str) -> std::result::Result<Self, String> {
        serde_json::from_str(text).map(Json).map_err(|e| e.to_string())
    }

    fn check(text: &str) -> bool {
        serde_json::from_str::<serde_json::Value>(text).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn text_is_verbatim() {
        let s = "<input string>\n  with  spacing\n".to_string();
        assert_eq!(String::decode(&s.encode().unwrap()).unwrap(), s);
        assert!(!String::check(""));
        assert!(String::check("\n"));
    }

    #[test]
    fn scalar_round_trip_is_exact() {
        for v in [5.7, 300.0, 3.50, -1e-12, 0.1 + 0.2] {
            let text = v.encode().unwrap();
            assert_eq!(f64::decode(&text).unwrap(), v);
        }
    }

    #[test]
    fn scalar_rejects_non_finite_and_garbage() {
        assert!(matches!(
            f64::NAN.encode(),
            Err(Error::Serialization { .. })
        ));
        assert!(f64::decode("abc").is_err());
        assert!(!f64::check(""));
        assert!(f64::check(" 5.7\n"));
    }

    #[test]
    fn matrix_round_trip() {
        let m = Matrix::new(vec![vec![1.0, 0.5], vec![0.5, 2.25]]);
        let text = m.encode().unwrap();
        assert_eq!(text, "1 0.5\n0.5 2.25\n");
        assert_eq!(Matrix::decode(&text).unwrap(), m);
        assert_eq!(m.shape(), (2, 2));
    }

    #[test]
    fn matrix_rejects_ragged_rows() {
        let m = Matrix::new(vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(m.encode().is_err());
        assert!(Matrix::decode("1 2\n3\n").is_err());
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct ZRow {
        symbol: String,
        keys: [Option<usize>; 3],
        names: [Option<String>; 3],
        values: [Option<f64>; 3],
    }

    #[test]
    fn json_wraps_structured_objects() {
        let zma = vec![
            ZRow {
                symbol: "O".to_string(),
                keys: [None, None, None],
                names: [None, None, None],
                values: [None, None, None],
            },
            ZRow {
                symbol: "H".to_string(),
                keys: [Some(0), None, None],
                names: [Some("R1".to_string()), None, None],
                values: [Some(1.84779), None, None],
            },
        ];
        let zma = Json(zma);
        let text = zma.encode().unwrap();
        let back: Json<Vec<ZRow>> = Json::decode(&text).unwrap();
        assert_eq!(back, zma);
        assert!(Json::<Vec<ZRow>>::check(&text));
        assert!(!Json::<Vec<ZRow>>::check("{truncated"));
    }
}
