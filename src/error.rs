//! Crate error type.

use thiserror::Error;

/// Failures at the browser edge: HTTP, the page, or the server's answer.
#[derive(Debug, Error)]
pub enum VizError {
	/// The request could not be sent or its body not decoded.
	#[error("request failed: {0}")]
	Http(#[from] gloo_net::Error),
	/// The server answered with a non-success status.
	#[error("{url} answered {status}")]
	Status {
		/// Requested URL.
		url: String,
		/// HTTP status code.
		status: u16,
	},
	/// The server refused a position update.
	#[error("server refused position update for {handle_id}")]
	Rejected {
		/// Handle of the row that was not updated.
		handle_id: String,
	},
	/// No CSRF token input on the page.
	#[error("no CSRF token found on page")]
	MissingCsrfToken,
	/// Running outside a browser window.
	#[error("no browser window available")]
	NoWindow,
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, VizError>;
