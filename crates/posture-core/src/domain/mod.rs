//! Domain entities mirroring the backend's response shapes

pub mod access;
pub mod audit;
pub mod commentary;
pub mod device;
pub mod mfa;
pub mod report;
pub mod score;
pub mod tenant;
pub mod widget;

pub use access::{TenantAccessDraft, TenantAccessRequest, UserModel};
pub use audit::{AuditAction, AuditLog, NewAuditEntry};
pub use commentary::{AnalystComment, AnalystCommentary, PreviousComment};
pub use device::UnencryptedDevice;
pub use mfa::{EvaluatedMethod, MethodState, MfaEvaluation, PhishResistance};
pub use report::{AppsReport, CloudFinding, DataReport, IdentityReport, Person};
pub use score::{CategoryScore, ScoreCategory, SecureScoreEntry};
pub use tenant::{
    CreateTenantRequest, Guarantee, GuaranteeToggle, GuaranteeUpdate, M365Credentials,
    Microsoft365Connection, Tenant,
};
pub use widget::ManualWidget;
