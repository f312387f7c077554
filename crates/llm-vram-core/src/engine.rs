//! Per-region memory formulas.
//!
//! The context footprint of a llama.cpp style runtime is modelled as three
//! regions (input buffers, compute scratch, KV cache); the weights are a
//! fourth. Input buffers are counted in elements and added to the byte
//! counts unchanged, matching how llama.cpp sizes its index tensors.

use crate::descriptor::ModelDescriptor;
use crate::diagnostics::{Diagnostic, Diagnostics};
use tracing::debug;

/// Batch size the compute-buffer formula was calibrated against.
pub const REFERENCE_BATCH_SIZE: u64 = 512;

/// Bytes in one gibibyte.
pub const BYTES_PER_GIB: f64 = (1u64 << 30) as f64;

/// Elements held by the per-forward-pass input buffers.
///
/// Computed in `f64` like the other regions, so oversized contexts grow the
/// estimate instead of overflowing.
pub fn input_buffer(context_length: u64, model: &ModelDescriptor, batch_size: u64) -> f64 {
    let batch = batch_size as f64;
    let context = context_length as f64;
    let tokens = batch;
    let embeddings = model.hidden_size() as f64 * batch;
    let positions = batch;
    let kq_mask = context * batch;
    let k_shift = context;
    let sum = batch;
    tokens + embeddings + positions + kq_mask + k_shift + sum
}

/// Bytes of activation scratch space.
///
/// Batch size does not enter the formula; anything other than
/// [`REFERENCE_BATCH_SIZE`] raises [`Diagnostic::NonStandardBatchSize`].
pub fn compute_buffer(
    context_length: u64,
    model: &ModelDescriptor,
    batch_size: u64,
    diagnostics: &mut Diagnostics,
) -> f64 {
    if batch_size != REFERENCE_BATCH_SIZE {
        diagnostics.raise(Diagnostic::NonStandardBatchSize {
            batch_size,
            reference: REFERENCE_BATCH_SIZE,
        });
    }
    (context_length as f64 / 1024.0 * 2.0 + 0.75)
        * model.num_attention_heads() as f64
        * 1024.0
        * 1024.0
}

/// Bytes of key/value cache.
///
/// Grouped-query attention shrinks the cached embedding width by the
/// query/KV head ratio. The ratio stays in floating point.
pub fn kv_cache(context_length: u64, model: &ModelDescriptor, cache_bits: u32) -> f64 {
    let n_embd_gqa = model.hidden_size() as f64 / model.gqa_ratio();
    let n_elements = n_embd_gqa * (model.num_hidden_layers() as f64 * context_length as f64);
    // keys + values
    let size = 2.0 * n_elements;
    size * (f64::from(cache_bits) / 8.0)
}

/// Bytes needed for a context window, rounded to two decimals.
pub fn context_size(
    context_length: u64,
    model: &ModelDescriptor,
    batch_size: u64,
    cache_bits: u32,
    diagnostics: &mut Diagnostics,
) -> f64 {
    let input = input_buffer(context_length, model, batch_size);
    let kv = kv_cache(context_length, model, cache_bits);
    let compute = compute_buffer(context_length, model, batch_size, diagnostics);
    debug!(
        context_length,
        batch_size,
        cache_bits,
        input_elements = input,
        kv_cache_bytes = kv,
        compute_buffer_bytes = compute,
        "context regions"
    );
    round2(input + kv + compute)
}

/// Bytes of quantized weights, rounded to two decimals.
pub fn model_weight_size(model: &ModelDescriptor, bits_per_weight: f64) -> f64 {
    round2(model.parameters() as f64 * bits_per_weight / 8.0)
}

/// Round to two decimal places.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[inline]
pub fn bytes_to_gib(bytes: f64) -> f64 {
    bytes / BYTES_PER_GIB
}
