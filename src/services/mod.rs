pub mod auth;
pub mod review;
pub mod role;
pub mod user;

pub use auth::{AuthService, SignIn};
pub use review::{NewReview, ReviewChanges, ReviewService, UserReviews};
pub use role::{PromotionOutcome, RoleService};
pub use user::{NewUser, UserChanges, UserService};
