//! # Protocol Marshaller
//!
//! Walks a model's binding table in declaration order and writes every present
//! field into a sink. Stateless: one marshaller is shared by all invocations
//! and threads.

use tracing::debug;
use tracing::trace;

use crate::codec;
use crate::codec::Cx;
use crate::error::MarshallingError;
use crate::sink::Sink;
use crate::value::Structured;

/// Marshaller tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarshallerConfig {
    /// Maximum nesting of structured values below the request model.
    pub max_depth: usize,
}

impl MarshallerConfig {
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for MarshallerConfig {
    fn default() -> Self {
        Self { max_depth: 32 }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProtocolMarshaller {
    config: MarshallerConfig,
}

impl ProtocolMarshaller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MarshallerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MarshallerConfig {
        &self.config
    }

    /// Writes every present field of `model` into `sink`.
    ///
    /// A missing model or an inconsistent binding table is rejected before the
    /// sink is touched. On failure the sink may hold the writes of the fields
    /// that preceded the failing one.
    pub fn marshall<M, S>(&self, model: Option<&M>, sink: &mut S) -> Result<(), MarshallingError>
    where
        M: Structured,
        S: Sink,
    {
        let Some(model) = model else {
            return Err(MarshallingError::MissingModel);
        };
        self.marshall_fields(model, sink, Cx::ROOT)
    }

    /// Same as [`marshall`](Self::marshall), for a type-erased model.
    pub fn marshall_dyn<S: Sink>(&self, model: &dyn Structured, sink: &mut S) -> Result<(), MarshallingError> {
        self.marshall_fields(model, sink, Cx::ROOT)
    }

    pub(crate) fn marshall_fields<S: Sink>(
        &self,
        model: &dyn Structured,
        sink: &mut S,
        cx: Cx,
    ) -> Result<(), MarshallingError> {
        let shape = model.shape();
        if let Err(e) = shape.validate() {
            debug!(shape = shape.name(), error = %e, "rejected binding table");
            return Err(MarshallingError::InvalidShape(e));
        }
        for (index, binding) in shape.fields().iter().enumerate() {
            let value = model.field(index);
            trace!(
                shape = shape.name(),
                field = binding.wire_name(),
                location = ?binding.location(),
                present = value.is_some(),
                depth = cx.depth,
                "marshalling field"
            );
            if let Err(source) = codec::write(self, sink, binding, value, cx) {
                debug!(shape = shape.name(), field = binding.wire_name(), error = %source, "marshalling failed");
                return Err(MarshallingError::Field { shape: shape.name(), field: binding.wire_name(), source });
            }
        }
        Ok(())
    }
}
