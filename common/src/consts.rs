pub const API_KEY_HEADER: &str = "x-api-key";

pub const PROCESS_ROUTE: &str = "/process";
pub const HEALTH_ROUTE: &str = "/health";

pub const DOCUMENT_FIELD: &str = "document";
pub const RECORD_ID_FIELD: &str = "recordId";
pub const DPI_FIELD: &str = "dpi";
pub const FORMAT_FIELD: &str = "format";

pub const DEFAULT_DPI: u16 = 200;
