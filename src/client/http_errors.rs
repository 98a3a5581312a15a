use std::error::Error as StdError;
use std::io::ErrorKind;

use crate::error::ServiceError;

fn error_chain_has_io_kind(
    err: &(dyn StdError + 'static),
    kind: ErrorKind,
    needle: &str,
) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == kind
        {
            return true;
        }

        if source.to_string().to_ascii_lowercase().contains(needle) {
            return true;
        }

        current = source.source();
    }

    false
}

fn error_chain_has_connection_refused(err: &(dyn StdError + 'static)) -> bool {
    error_chain_has_io_kind(err, ErrorKind::ConnectionRefused, "connection refused")
}

fn error_chain_has_timeout(err: &(dyn StdError + 'static)) -> bool {
    error_chain_has_io_kind(err, ErrorKind::TimedOut, "timed out")
}

/// Maps a reqwest failure to a `ServiceError` that tells the user what to check.
pub(crate) fn transport_error(err: reqwest::Error, api_url: &str, timeout_secs: u64) -> ServiceError {
    let api_url = api_url.to_string();

    if err.is_timeout() || error_chain_has_timeout(&err) {
        return ServiceError::Timeout {
            api_url,
            timeout_secs,
        };
    }

    if err.is_connect() {
        if error_chain_has_connection_refused(&err) {
            return ServiceError::ConnectionRefused { api_url };
        }
        return ServiceError::Connect { api_url };
    }

    ServiceError::Request {
        api_url,
        message: err.to_string(),
    }
}
