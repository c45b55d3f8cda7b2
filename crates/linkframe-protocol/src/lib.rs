pub mod ascii;
pub mod codec;
pub mod escape;
pub mod frame;
pub mod hex_field;
pub mod link_codec;
pub mod status;
pub mod stream_parser;

pub use codec::{FrameCodec, parse_frame};
pub use frame::{Frame, crc32};
pub use hex_field::{BoundedHexField, HexOutcome};
pub use link_codec::{LinkCodec, Outgoing, Received};
pub use status::{CheckKind, Diagnosis, FrameLengths, ValidationStatus};
pub use stream_parser::{DrainCandidates, ParserState, StreamParser, split_records};
