// Model exports
pub mod domain;
pub mod raw;
pub mod requests;
pub mod responses;

pub use domain::{
    CandidateRecord, Education, ExternalProfile, Grade, IntentContent, IntentType, Location,
    MatchingOutcome, MatchingResult, RequesterContext, WorkExperience,
};
pub use raw::{RawExternalProfile, RawRequester, RawUser};
pub use requests::{MatchingRequest, MatchingRequestBody};
pub use responses::{ErrorResponse, HealthResponse, MatchingResponse};
