//! Maps a `--from`/`--to` format name to the [`Converter`] that implements
//! it, for every manifest format this binary accepts at minimum.

use vellum_converters::installed::InstalledConverter;
use vellum_converters::lockfile::LockfileConverter;
use vellum_converters::manifest::ManifestConverter;
use vellum_converters::metadata::MetadataConverter;
use vellum_converters::pipfile::{PipfileConverter, PipfileLockConverter};
use vellum_converters::requirements_pair::{RequirementsInConverter, RequirementsLockConverter};
use vellum_converters::requirements_txt::RequirementsTxtConverter;
use vellum_converters::setup_py::SetupPyConverter;
use vellum_converters::Converter;

/// Every format name this binary accepts for `--from-format`/`--to-format`,
/// in the order `--help` should list them.
pub const FORMAT_NAMES: &[&str] = &[
    "requirements.txt",
    "requirements.in",
    "requirements-lock.txt",
    "metadata",
    "lockfile",
    "pyproject-manifest",
    "Pipfile",
    "Pipfile.lock",
    "installed",
    "setup.py",
];

/// Build the converter for `name`.
///
/// # Errors
/// Returns a description of the unknown name and the valid set, suitable
/// for a CLI usage error.
pub fn by_name(name: &str) -> Result<Box<dyn Converter>, String> {
    let converter: Box<dyn Converter> = match name {
        "requirements.txt" => Box::new(RequirementsTxtConverter::new()),
        "requirements.in" => Box::new(RequirementsInConverter::new()),
        "requirements-lock.txt" => Box::new(RequirementsLockConverter::new()),
        "metadata" => Box::new(MetadataConverter::new()),
        "lockfile" => Box::new(LockfileConverter::new()),
        "pyproject-manifest" => Box::new(ManifestConverter::new()),
        "Pipfile" => Box::new(PipfileConverter::new()),
        "Pipfile.lock" => Box::new(PipfileLockConverter::new()),
        "installed" => Box::new(InstalledConverter::new()),
        "setup.py" => Box::new(SetupPyConverter::new()),
        other => {
            return Err(format!(
                "unknown format '{other}', expected one of: {}",
                FORMAT_NAMES.join(", ")
            ))
        }
    };
    Ok(converter)
}
