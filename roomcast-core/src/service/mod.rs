pub mod egress;
pub mod ingress;
pub mod participants;
pub mod rooms;

pub use egress::{EgressOrchestrator, FullRecording, RecordingKind, StopOutcome, StopReport};
pub use ingress::IngressService;
pub use participants::{ParticipantService, ParticipantSummary, Role};
pub use rooms::RoomService;
