pub const INVALID_INPUT: &str = "invalid_input";
pub const FORMAT_ERROR: &str = "format_error";
pub const VALIDATION_ERROR: &str = "validation_error";
pub const OPERATION_ERROR: &str = "operation_error";
pub const NOT_FOUND: &str = "not_found";
