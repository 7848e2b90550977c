pub mod assignment_service;
pub mod evaluation_model_service;
pub mod helpers;
pub mod project_service;
pub mod staff_service;
pub mod table_items;
pub mod validation;
pub mod work_item_service;

pub use assignment_service::AssignmentService;
pub use evaluation_model_service::EvaluationModelService;
pub use project_service::ProjectService;
pub use staff_service::StaffService;
pub use table_items::{TableItemsService, WriteLock};
pub use validation::ValidationService;
pub use work_item_service::WorkItemService;
