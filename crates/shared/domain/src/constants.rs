//! Domain-level constants.
//!
//! These constants define business rules, storage layout and seed values.

// =============================================================================
// User Roles
// =============================================================================

/// Resident role: owns a profile, sees only their own data
pub const ROLE_RESIDENT: &str = "resident";

/// Administrator role with access to every resident
pub const ROLE_ADMIN: &str = "admin";

/// All valid role values
pub const VALID_ROLES: &[&str] = &[ROLE_RESIDENT, ROLE_ADMIN];

/// Check if a role value is valid
pub fn is_valid_role(role: &str) -> bool {
    VALID_ROLES.contains(&role)
}

// =============================================================================
// Storage
// =============================================================================

/// Key holding the whole serialized database blob
pub const STORAGE_KEY: &str = "portal_db_v1";

/// Key holding the serialized session snapshot
pub const SESSION_KEY: &str = "portal_session";

// =============================================================================
// Profile defaults
// =============================================================================

/// Speed assigned to freshly created residents (Mbps)
pub const DEFAULT_INTERNET_SPEED: u32 = 150;

/// Upper bound of the speed slider (Mbps); enforced by forms, not by the store
pub const MAX_INTERNET_SPEED: u32 = 200;

/// Day of month on which payments fall due
pub const PAYMENT_DUE_DAY: u32 = 5;

/// Amount shown on generated billing-history entries
pub const DEFAULT_BILLING_AMOUNT: &str = "$2,500.00";

/// Welcome message seeded into every new resident's inbox
pub const WELCOME_MESSAGE: &str = "Bienvenido a Residencial WiFi.\n\
Actualmente navega a 150 Mb de velocidad.\n\
¿Sabía que puede disfrutar de Claro Video gratis como parte de su servicio?\n\
Si tiene alguna duda, estoy aquí para ayudarle.";

// =============================================================================
// Authentication
// =============================================================================

/// Password shared by every seeded demo account
pub const SEED_PASSWORD: &str = "123";

/// Generic reason returned for any failed login
pub const INVALID_CREDENTIALS_REASON: &str = "Credenciales inválidas";

/// Landing page for unauthenticated visitors
pub const LOGIN_PAGE: &str = "./index.html";

/// Landing page for non-admin users
pub const RESIDENT_PAGE: &str = "./dashboard.html";

// =============================================================================
// WiFi
// =============================================================================

/// Alphabet for generated WiFi passwords (no 0/O, 1/I look-alikes)
pub const WIFI_PASSWORD_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of generated WiFi passwords
pub const WIFI_PASSWORD_LENGTH: usize = 8;

/// External QR rendering endpoint
pub const DEFAULT_QR_SERVICE_URL: &str = "https://api.qrserver.com/v1/create-qr-code/";

/// Requested QR image size
pub const QR_IMAGE_SIZE: &str = "200x200";
