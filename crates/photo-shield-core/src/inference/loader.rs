//! Safetensors weight loading.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use once_cell::sync::OnceCell;
use safetensors::SafeTensors;
use tracing::debug;

/// A model that is built from its weight file on first use.
///
/// A failed load is not cached; the next call tries again.
pub struct LazyModel<T> {
    path: PathBuf,
    device: Device,
    builder: fn(VarBuilder) -> Result<T>,
    model: OnceCell<T>,
}

impl<T: Send + Sync> LazyModel<T> {
    #[must_use]
    pub fn new(
        path: impl AsRef<Path>,
        device: Device,
        builder: fn(VarBuilder) -> Result<T>,
    ) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            device,
            builder,
            model: OnceCell::new(),
        }
    }

    /// Weight file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the model, loading it if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the weight file is missing or invalid, or the
    /// builder rejects it.
    pub fn get(&self) -> Result<&T> {
        self.model.get_or_try_init(|| {
            let vb = load_safetensors(&self.path, &self.device)?;
            (self.builder)(vb)
                .with_context(|| format!("Failed to build model from {}", self.path.display()))
        })
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }
}

/// Reads a safetensors file into a `VarBuilder` on `device`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid safetensors, or
/// holds a dtype candle does not support.
pub fn load_safetensors(path: impl AsRef<Path>, device: &Device) -> Result<VarBuilder<'static>> {
    let path = path.as_ref();
    debug!("Loading weights from {}", path.display());

    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read model file: {}", path.display()))?;
    let tensors = SafeTensors::deserialize(&data)
        .with_context(|| format!("Failed to parse safetensors: {}", path.display()))?;

    let weights = tensors
        .tensors()
        .into_iter()
        .map(|(name, view)| {
            let dtype = candle_dtype(view.dtype())?;
            let tensor = Tensor::from_raw_buffer(view.data(), dtype, view.shape(), device)
                .with_context(|| format!("Failed to create tensor '{name}'"))?;
            Ok((name, tensor))
        })
        .collect::<Result<HashMap<String, Tensor>>>()?;

    debug!("Loaded {} tensors", weights.len());
    Ok(VarBuilder::from_tensors(weights, DType::F32, device))
}

fn candle_dtype(dtype: safetensors::Dtype) -> Result<DType> {
    use safetensors::Dtype as S;
    Ok(match dtype {
        S::F32 => DType::F32,
        S::F64 => DType::F64,
        S::F16 => DType::F16,
        S::BF16 => DType::BF16,
        S::I64 => DType::I64,
        S::U8 => DType::U8,
        S::U32 => DType::U32,
        other => anyhow::bail!("Unsupported dtype: {other:?}"),
    })
}
