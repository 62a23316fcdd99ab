mod fetch_key;
mod inspect_certificate;

pub use self::fetch_key::FetchKeyCommand;
pub use self::inspect_certificate::InspectCertificateCommand;
