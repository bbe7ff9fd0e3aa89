//! Members domain module.
//!
//! Member registration and profile management, plus the credential check and
//! token issuance behind `/login/token` and `/login/session`. Storage is
//! reached only through [`MemberRepository`].

pub mod login;
pub mod member;
pub mod repository;
pub mod service;

pub use login::LoginService;
pub use member::{Email, Member, MemberChanges, MemberName, NewMember};
pub use repository::{MemberRepository, MemberStoreError};
pub use service::{MemberError, MemberInput, MemberService};
