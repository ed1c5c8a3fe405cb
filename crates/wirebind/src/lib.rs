//! # Wirebind
//!
//! Declarative marshalling of request models onto wire locations.
//!
//! ## Architecture
//!
//! - A [`Binding`] says where one field goes (path label, query parameter, header,
//!   or payload) and what kind of value it carries. Bindings are `const` data.
//! - A [`Shape`] is the ordered binding table of one structured type.
//! - A model implements [`Structured`], exposing its shape and field values as
//!   borrowed [`Value`]s. The [`structured!`] macro writes that impl.
//! - The [`ProtocolMarshaller`] walks the shape in order and hands every present
//!   field to the value codec, which renders it and writes it into a [`Sink`].
//! - Closed vocabularies are declared with [`wire_enum!`] and parsed fail-closed.

pub mod binding;
pub mod codec;
pub mod error;
pub mod marshaller;
pub mod recording;
pub mod sink;
pub mod value;
pub mod vocab;

mod macros;


pub use binding::Binding;
pub use binding::ElementKind;
pub use binding::Location;
pub use binding::Shape;
pub use binding::ValueKind;
pub use codec::CodecError;
pub use error::ConfigurationError;
pub use error::MarshallingError;
pub use error::UnknownVariantError;
pub use marshaller::MarshallerConfig;
pub use marshaller::ProtocolMarshaller;
pub use sink::Sink;
pub use sink::WireValue;
pub use value::Blob;
pub use value::StaticShape;
pub use value::Structured;
pub use value::ToValue;
pub use value::Value;
pub use vocab::Vocabulary;
pub use vocab::WireEnum;
