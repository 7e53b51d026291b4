use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use kasuwa_engine::traits::{
    AccountApiError,
    AuthApiError,
    CatalogApiError,
    PaymentGatewayError,
    WalletApiError,
};
use paystack_tools::PaystackApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Payload deserialization error")]
    CouldNotDeserializePayload,
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("The resource already exists. {0}")]
    ResourceConflict(String),
    #[error("The requested change is not allowed. {0}")]
    InvalidStateChange(String),
    #[error("The payment gateway rejected the request. {0}")]
    PaymentProviderError(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::CouldNotDeserializePayload => StatusCode::BAD_REQUEST,
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::PoorlyFormattedToken(_) => StatusCode::BAD_REQUEST,
                AuthError::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
                AuthError::AccountNotFound => StatusCode::FORBIDDEN,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::ResourceConflict(_) => StatusCode::CONFLICT,
            Self::InvalidStateChange(_) => StatusCode::CONFLICT,
            Self::PaymentProviderError(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("Access token is invalid. {0}")]
    ValidationError(String),
    #[error("Access token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("User account not found.")]
    AccountNotFound,
}

impl From<AuthApiError> for ServerError {
    fn from(e: AuthApiError) -> Self {
        match e {
            AuthApiError::UserNotFound => Self::AuthenticationError(AuthError::AccountNotFound),
            AuthApiError::RoleNotAllowed(_) => {
                Self::AuthenticationError(AuthError::InsufficientPermissions(e.to_string()))
            },
            AuthApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<AccountApiError> for ServerError {
    fn from(e: AccountApiError) -> Self {
        match e {
            AccountApiError::UserNotFound(_) => Self::NoRecordFound(e.to_string()),
            AccountApiError::DuplicateEmail(_) => Self::ResourceConflict(e.to_string()),
            AccountApiError::VendorAlreadyRegistered(_) => Self::ResourceConflict(e.to_string()),
            AccountApiError::QueryError(e) => Self::InvalidRequestBody(e),
            AccountApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<PaymentGatewayError> for ServerError {
    fn from(e: PaymentGatewayError) -> Self {
        match e {
            PaymentGatewayError::EmptyOrder | PaymentGatewayError::InvalidQuantity => {
                Self::InvalidRequestBody(e.to_string())
            },
            PaymentGatewayError::ProductNotPurchasable(_) => Self::InvalidRequestBody(e.to_string()),
            PaymentGatewayError::OrderNotFound(_) | PaymentGatewayError::PaymentNotFound(_) => {
                Self::NoRecordFound(e.to_string())
            },
            PaymentGatewayError::PaymentAlreadyExists(_) => Self::ResourceConflict(e.to_string()),
            PaymentGatewayError::InvalidStatusChange { .. } => Self::InvalidStateChange(e.to_string()),
            PaymentGatewayError::OrderNumberExhausted => Self::BackendError(e.to_string()),
            PaymentGatewayError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            PaymentGatewayError::AccountError(e) => e.into(),
        }
    }
}

impl From<WalletApiError> for ServerError {
    fn from(e: WalletApiError) -> Self {
        match e {
            WalletApiError::WalletNotFound(_) | WalletApiError::WithdrawalNotFound(_) => {
                Self::NoRecordFound(e.to_string())
            },
            WalletApiError::InvalidAmount => Self::InvalidRequestBody(e.to_string()),
            WalletApiError::InsufficientFunds { .. } => Self::InvalidRequestBody(e.to_string()),
            WalletApiError::WithdrawalAlreadySettled { .. } => Self::InvalidStateChange(e.to_string()),
            WalletApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<CatalogApiError> for ServerError {
    fn from(e: CatalogApiError) -> Self {
        match e {
            CatalogApiError::ProductNotFound(_) | CatalogApiError::VendorNotFound(_) => {
                Self::NoRecordFound(e.to_string())
            },
            CatalogApiError::InvalidRating(_) => Self::InvalidRequestBody(e.to_string()),
            CatalogApiError::ReviewNotAllowed => Self::InsufficientPermissions(e.to_string()),
            CatalogApiError::DuplicateReview => Self::ResourceConflict(e.to_string()),
            CatalogApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<PaystackApiError> for ServerError {
    fn from(e: PaystackApiError) -> Self {
        Self::PaymentProviderError(e.to_string())
    }
}
