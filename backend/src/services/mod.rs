pub mod credit_score_service;
pub mod expense_service;
pub mod friend_service;
pub mod group_service;
pub mod notification_service;
pub mod payment_service;
pub mod user_service;

pub use credit_score_service::CreditScoreService;
pub use expense_service::ExpenseService;
pub use friend_service::FriendService;
pub use group_service::GroupService;
pub use notification_service::NotificationService;
pub use payment_service::PaymentService;
pub use user_service::UserService;
