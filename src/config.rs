//! Application-level configuration constants.

// Page mode
pub const SEARCH_MODE_SELECTOR: &str = ".js-asset-search";

// Widget roots
pub const PRODUCTS_ROOT: &str = ".js-products-search";
pub const AUTHORS_ROOT: &str = ".js-authors-search";
pub const CAMPAIGNS_ROOT: &str = ".js-campaign-search";
pub const DATE_PICKER: &str = ".js-date-picker";
pub const TAG_CHIPS_ROOT: &str = ".add-and-edit-chips";
pub const MULTISELECT: &str = ".js-multiselect";
pub const SELECT: &str = ".js-select";
pub const TAGS_INPUT: &str = ".js-tags";
pub const SALESFORCE_ID_INPUT: &str = ".js-salesforce-campaign-id";

// Elements inside the widget roots
pub const PRODUCTS_INPUT: &str = ".js-search-input";
pub const PRODUCT_CHIP: &str = ".p-chip.js-unselected";
pub const CATEGORY_HEADING: &str = ".p-filter-panel-section__heading";
pub const HIDDEN_FIELD: &str = ".js-hidden-field";
pub const CATEGORIES_FIELD: &str = "input[name='categories']";
pub const AUTHORS_INPUT: &str = ".js-authors-input";
pub const AUTHOR_EMAIL_FIELD: &str = ".js-hidden-field-email";
pub const AUTHOR_FIRSTNAME_FIELD: &str = ".js-hidden-field-firstname";
pub const AUTHOR_LASTNAME_FIELD: &str = ".js-hidden-field-lastname";
pub const SELECTED_AUTHOR: &str = ".js-author-chip";
pub const CAMPAIGNS_INPUT: &str = ".js-campaign-input";
pub const START_DATE_FIELD: &str = ".js-hidden-field-startdate";
pub const END_DATE_FIELD: &str = ".js-hidden-field-enddate";
pub const TAG_CHIPS_INPUT: &str = "input[type='text']";
pub const EXISTING_TAG_CHIPS: &str = ".added-chips .u-hide";
pub const SUBMIT_BUTTONS: &str = "button[type='submit']";

// Data attributes
pub const DEBOUNCE_ATTR: &str = "data-debounce-ms";
pub const EMPTY_QUERY_ATTR: &str = "data-empty-query";

// Query keys
pub const PRODUCTS_QUERY_KEY: &str = "product_types";
pub const AUTHOR_EMAIL_KEY: &str = "author_email";
pub const AUTHOR_FIRSTNAME_KEY: &str = "author_firstname";
pub const AUTHOR_LASTNAME_KEY: &str = "author_lastname";
pub const START_DATE_KEY: &str = "start_date";
pub const END_DATE_KEY: &str = "end_date";

// Matching and layout
pub const FUZZY_THRESHOLD: f64 = 0.3;
pub const OVERFLOW_ROW_LIMIT: i32 = 1;

// Min/Max limits for per-instance overrides
pub const MIN_DEBOUNCE_MS: u32 = 0;
pub const MAX_DEBOUNCE_MS: u32 = 5_000;
