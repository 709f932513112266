//! Utilities for error handling

use std::{
    backtrace::{Backtrace, BacktraceStatus},
    fmt::Display,
};

use downcast_rs::{impl_downcast, DowncastSync};
use thiserror::Error;

use crate::{
    context::Context,
    location::{Located, Location},
    printable::{Printable, State},
};

/// The kinds of errors we have during compilation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input text does not follow the grammar.
    #[error("syntax error")]
    Syntax,
    /// The input parsed, but cannot be lowered (unknown names, arity, redefinition ...).
    #[error("semantic error")]
    Semantic,
    /// The generated IR was found to be inconsistent during verification.
    #[error("verification failed")]
    VerificationFailed,
    /// Inconsistent or invalid argument(s) passed to an IR building function.
    #[error("invalid argument")]
    InvalidArgument,
}

/// An error object that can hold any [std::error::Error].
#[derive(Debug)]
pub struct Error {
    /// The kind of error this is
    pub kind: ErrorKind,
    /// The actual error object describing the error
    pub err: Box<dyn ArchonError>,
    /// Location of this error in the program text
    pub loc: Location,
    /// Details of how this error occurred
    pub backtrace: Backtrace,
}

impl Error {
    /// Get the underlying error as `T`, if it is one.
    pub fn downcast_ref<T: ArchonError>(&self) -> Option<&T> {
        self.err.downcast_ref::<T>()
    }
}

/// This does not print [Location] or [Backtrace]. Use [Printable::disp] for that.
impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.err)
    }
}

pub trait ArchonError: std::error::Error + DowncastSync {}

impl<T: std::error::Error + Send + Sync + 'static> ArchonError for T {}

impl_downcast!(sync ArchonError);

impl std::error::Error for Error {}

impl Printable for Error {
    fn fmt(
        &self,
        ctx: &Context,
        _state: &State,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        if self.loc.is_known() {
            write!(f, "[{}] ", self.loc.disp(ctx))?;
        }
        write!(f, "{}: {}", self.kind, self.err)?;
        if self.backtrace.status() == BacktraceStatus::Captured {
            write!(f, "\nError backtrace:\n{}", self.backtrace)?;
        }
        Ok(())
    }
}

impl Located for Error {
    fn loc(&self) -> Location {
        self.loc
    }

    fn set_loc(&mut self, loc: Location) {
        self.loc = loc;
    }
}

/// Type alias for [std::result::Result] with the error type set to [struct@Error]
pub type Result<T> = std::result::Result<T, Error>;

#[doc(hidden)]
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StringError(pub String);

/// Specify [ErrorKind] and create [struct@Error] from any [std::error::Error] object.
/// The macro also accepts [format!] like arguments to create one-off errors.
#[macro_export]
macro_rules! create_error {
    ($loc: expr, $kind: expr, $str: literal $($t:tt)*) => {
        $crate::create_error!($loc, $kind, $crate::result::StringError(format!($str $($t)*)))
    };
    ($loc: expr, $kind: expr, $err: expr) => {
        $crate::result::Error {
            kind: $kind,
            err: Box::new($err),
            loc: $loc,
            backtrace: std::backtrace::Backtrace::capture(),
        }
    };
}

/// Specify [ErrorKind] and create [Result] from any [std::error::Error] object.
/// To create [struct@Error], use [create_error!](crate::create_error) instead.
#[macro_export]
macro_rules! create_err {
    ($loc: expr, $kind: expr, $($t:tt)*) => {
        Err($crate::create_error!($loc, $kind, $($t)*))
    };
}

/// Create [ErrorKind::Syntax] [Result] from any [std::error::Error] object.
/// ```rust
/// use thiserror::Error;
/// use archon::{syntax_err, result::{Result, ErrorKind, Error}, location::Location};
///
/// #[derive(Error, Debug)]
/// #[error("sample error")]
/// pub struct SampleErr;
///
/// assert!(
///     matches!(
///         syntax_err!(Location::Unknown, SampleErr),
///         Result::<()>::Err(Error {
///            kind: ErrorKind::Syntax,
///            err,
///            ..
///         }) if err.is::<SampleErr>()
/// ));
/// ```
#[macro_export]
macro_rules! syntax_err {
    ($loc: expr, $($t:tt)*) => {
        $crate::create_err!($loc, $crate::result::ErrorKind::Syntax, $($t)*)
    }
}

/// Create [ErrorKind::Semantic] [Result] from any [std::error::Error] object.
#[macro_export]
macro_rules! semantic_err {
    ($loc: expr, $($t:tt)*) => {
        $crate::create_err!($loc, $crate::result::ErrorKind::Semantic, $($t)*)
    }
}

/// Create [ErrorKind::VerificationFailed] [Result] from any [std::error::Error] object.
/// The macro also accepts [format!] like arguments to create one-off errors.
/// ```rust
/// use archon::{verify_err, result::{Result, ErrorKind, Error}, location::Location};
///
/// let res_msg: Result<()> = verify_err!(Location::Unknown, "Some formatted {}", 0);
/// assert!(matches!(
///     res_msg,
///     Err(Error { kind: ErrorKind::VerificationFailed, ref err, .. })
///         if err.to_string() == "Some formatted 0"
/// ));
/// ```
#[macro_export]
macro_rules! verify_err {
    ($loc: expr, $($t:tt)*) => {
        $crate::create_err!($loc, $crate::result::ErrorKind::VerificationFailed, $($t)*)
    }
}

/// Create [ErrorKind::InvalidArgument] [Result] from any [std::error::Error] object.
#[macro_export]
macro_rules! arg_err {
    ($loc: expr, $($t:tt)*) => {
        $crate::create_err!($loc, $crate::result::ErrorKind::InvalidArgument, $($t)*)
    }
}
