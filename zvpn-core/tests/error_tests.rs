//! Unit tests for error types and conversions

use zvpn_core::error::{ConfigError, InputError, PreconditionError, ProcessError, ZvpnError};

#[test]
fn test_precondition_error_display() {
    let error = PreconditionError::NotPrivileged;
    assert_eq!(
        error.to_string(),
        "This program must be run with sudo or as the root user."
    );

    let error = ZvpnError::from(PreconditionError::ClientNotFound {
        binary: "openvpn".to_string(),
    });
    assert_eq!(
        error.to_string(),
        "openvpn is not installed on your system. Please install it first."
    );
}

#[test]
fn test_input_error_display() {
    let error = InputError::InvalidChoice {
        input: "7".to_string(),
    };
    assert_eq!(error.to_string(), "Invalid choice: \"7\"");
}

#[test]
fn test_process_error_display() {
    let error = ProcessError::TerminationFailed {
        reason: "Operation not permitted".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "Failed to stop the VPN service: Operation not permitted"
    );
}

#[test]
fn test_zvpn_error_from_config() {
    let config_error = ConfigError::ValidationError {
        message: "Client binary cannot be empty".to_string(),
    };
    let zvpn_error: ZvpnError = config_error.into();
    assert!(matches!(zvpn_error, ZvpnError::Config(_)));
    assert_eq!(zvpn_error.exit_code(), 2);
}

#[test]
fn test_zvpn_error_from_io() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let zvpn_error: ZvpnError = io_error.into();
    assert!(matches!(zvpn_error, ZvpnError::Io(_)));
    assert_eq!(zvpn_error.exit_code(), 1);
}

#[test]
fn test_zvpn_error_from_toml() {
    let toml_error = toml::from_str::<toml::Table>("invalid toml").unwrap_err();
    let zvpn_error: ZvpnError = toml_error.into();
    assert!(matches!(zvpn_error, ZvpnError::Toml(_)));
}
