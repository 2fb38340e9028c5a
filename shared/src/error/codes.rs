//! Unified error codes for the POS engine
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Site (sede) errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Menu / inventory errors
//! - 7xxx: Table errors
//! - 8xxx: User / role / customer errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility with the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Stored session failed validation
    SessionInvalid = 1005,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 3xxx: Site ====================
    /// Operation requires a concrete site (not the global view)
    SiteNotSelected = 3001,
    /// Site not found
    SiteNotFound = 3002,
    /// The last remaining site cannot be deleted
    LastSite = 3003,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been completed
    OrderAlreadyCompleted = 4003,
    /// Order has already been cancelled
    OrderAlreadyCancelled = 4004,
    /// Order item not found
    OrderItemNotFound = 4006,
    /// Order is empty
    OrderEmpty = 4007,
    /// Item options do not match the menu item
    InvalidItemOptions = 4008,
    /// No item is waiting for options
    NoStagedItem = 4009,

    // ==================== 5xxx: Payment ====================
    /// Invalid payment method
    PaymentInvalidMethod = 5003,

    // ==================== 6xxx: Menu / Inventory ====================
    /// Menu item not found
    MenuItemNotFound = 6001,
    /// Inventory item not found
    InventoryItemNotFound = 6101,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// Table is occupied by another order
    TableOccupied = 7002,
    /// Zone not found
    ZoneNotFound = 7101,
    /// Zone has associated tables
    ZoneHasTables = 7102,

    // ==================== 8xxx: User / Role / Customer ====================
    /// User not found
    UserNotFound = 8001,
    /// Username already exists
    UsernameExists = 8002,
    /// The last remaining user cannot be deleted
    LastUser = 8003,
    /// Customer not found
    CustomerNotFound = 8005,
    /// Role not found
    RoleNotFound = 8101,
    /// Role is assigned to users
    RoleInUse = 8103,
    /// The last remaining role cannot be deleted
    LastRole = 8105,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Local storage error
    StorageError = 9002,
    /// Remote store unreachable or misconfigured
    TransportUnavailable = 9003,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Default user-facing message (es-CO)
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operación exitosa",
            ErrorCode::Unknown => "Ocurrió un error desconocido",
            ErrorCode::ValidationFailed => "Datos inválidos",
            ErrorCode::NotFound => "Recurso no encontrado",
            ErrorCode::AlreadyExists => "El recurso ya existe",
            ErrorCode::InvalidRequest => "Solicitud inválida",

            // Auth
            ErrorCode::NotAuthenticated => "Inicia sesión para continuar",
            ErrorCode::InvalidCredentials => "Credenciales inválidas",
            ErrorCode::SessionInvalid => "La sesión guardada no es válida",

            // Permission
            ErrorCode::PermissionDenied => "No tienes permiso para esta acción",

            // Site
            ErrorCode::SiteNotSelected => "Selecciona una sede específica para operar",
            ErrorCode::SiteNotFound => "Sede no encontrada",
            ErrorCode::LastSite => "No puedes eliminar la última sede.",

            // Order
            ErrorCode::OrderNotFound => "Orden no encontrada",
            ErrorCode::OrderAlreadyCompleted => "La orden ya fue cobrada",
            ErrorCode::OrderAlreadyCancelled => "La orden ya fue cancelada",
            ErrorCode::OrderItemNotFound => "Producto no encontrado en la orden",
            ErrorCode::OrderEmpty => "Añade productos a la orden",
            ErrorCode::InvalidItemOptions => "Opciones inválidas para este producto",
            ErrorCode::NoStagedItem => "No hay producto pendiente de opciones",

            // Payment
            ErrorCode::PaymentInvalidMethod => "Método de pago inválido",

            // Menu / Inventory
            ErrorCode::MenuItemNotFound => "Producto del menú no encontrado",
            ErrorCode::InventoryItemNotFound => "Insumo no encontrado",

            // Table
            ErrorCode::TableNotFound => "Mesa no encontrada",
            ErrorCode::TableOccupied => "La mesa ya tiene una orden activa",
            ErrorCode::ZoneNotFound => "Salón no encontrado",
            ErrorCode::ZoneHasTables => "No se puede eliminar un salón con mesas.",

            // User / Role / Customer
            ErrorCode::UserNotFound => "Usuario no encontrado",
            ErrorCode::UsernameExists => "El nombre de usuario ya existe",
            ErrorCode::LastUser => "No puedes eliminar el último usuario.",
            ErrorCode::CustomerNotFound => "Cliente no encontrado",
            ErrorCode::RoleNotFound => "Rol no encontrado",
            ErrorCode::RoleInUse => "El rol está asignado a usuarios",
            ErrorCode::LastRole => "No puedes eliminar el último rol.",

            // System
            ErrorCode::InternalError => "Error interno",
            ErrorCode::StorageError => "Error de almacenamiento local",
            ErrorCode::TransportUnavailable => "Error de conexión con la base de datos",
            ErrorCode::ConfigError => "Error de configuración",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1005 => Ok(ErrorCode::SessionInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // Site
            3001 => Ok(ErrorCode::SiteNotSelected),
            3002 => Ok(ErrorCode::SiteNotFound),
            3003 => Ok(ErrorCode::LastSite),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4003 => Ok(ErrorCode::OrderAlreadyCompleted),
            4004 => Ok(ErrorCode::OrderAlreadyCancelled),
            4006 => Ok(ErrorCode::OrderItemNotFound),
            4007 => Ok(ErrorCode::OrderEmpty),
            4008 => Ok(ErrorCode::InvalidItemOptions),
            4009 => Ok(ErrorCode::NoStagedItem),

            // Payment
            5003 => Ok(ErrorCode::PaymentInvalidMethod),

            // Menu / Inventory
            6001 => Ok(ErrorCode::MenuItemNotFound),
            6101 => Ok(ErrorCode::InventoryItemNotFound),

            // Table
            7001 => Ok(ErrorCode::TableNotFound),
            7002 => Ok(ErrorCode::TableOccupied),
            7101 => Ok(ErrorCode::ZoneNotFound),
            7102 => Ok(ErrorCode::ZoneHasTables),

            // User / Role / Customer
            8001 => Ok(ErrorCode::UserNotFound),
            8002 => Ok(ErrorCode::UsernameExists),
            8003 => Ok(ErrorCode::LastUser),
            8005 => Ok(ErrorCode::CustomerNotFound),
            8101 => Ok(ErrorCode::RoleNotFound),
            8103 => Ok(ErrorCode::RoleInUse),
            8105 => Ok(ErrorCode::LastRole),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::StorageError),
            9003 => Ok(ErrorCode::TransportUnavailable),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}
