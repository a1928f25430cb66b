//! Rust’s turnkey consent-flow switchboard—pick the best transport for a third-party consent
//! flow, build the hand-off descriptor, and reconcile whatever the transport hands back.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod config;
pub mod correlation;
pub mod dispatch;
pub mod error;
#[cfg(feature = "reqwest")] pub mod http;
pub mod ids;
pub mod obs;
pub mod probe;
pub mod recipe;
pub mod reconcile;
pub mod request;
pub mod switchboard;
pub mod track;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::{Arc, OnceLock},
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
