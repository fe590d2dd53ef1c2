//! Resource bundle lookup across a module's library-set chain.

use std::path::PathBuf;

use crate::module_info::ModuleInfo;

pub const PROPERTIES_EXTENSION: &str = ".properties";

/// SDK framework sub-libraries probed when no registered library carries
/// the requested bundle.
const SDK_FRAMEWORK_PROJECTS: [&str; 8] = [
    "framework",
    "spark",
    "mx",
    "airframework",
    "rpc",
    "advancedgrids",
    "charts",
    "textLayout",
];

/// Find the `.properties` file backing `(locale, bundle_name)` for a module.
///
/// Walks each owned set and its parent chain child-to-parent, returning the
/// first library whose bundle index contains the pair. Falls back to the
/// conventional bundle layout under the SDK's `frameworks/projects`
/// directory. Absence is a normal `None`, never an error.
pub fn find_resource_bundle(
    info: &ModuleInfo,
    locale: &str,
    bundle_name: &str,
) -> Option<PathBuf> {
    for owned in info.library_sets() {
        for set in owned.chain() {
            for library in set.libraries() {
                if library.has_resource_bundles()
                    && library.has_resource_bundle(locale, bundle_name)
                {
                    return Some(
                        library
                            .file()
                            .join("locale")
                            .join(locale)
                            .join(format!("{bundle_name}{PROPERTIES_EXTENSION}")),
                    );
                }
            }
        }
    }

    let frameworks = info.module().sdk_home.as_deref()?.join("frameworks/projects");
    for name in SDK_FRAMEWORK_PROJECTS {
        let candidate = frameworks
            .join(name)
            .join("bundles")
            .join(locale)
            .join(format!("{bundle_name}{PROPERTIES_EXTENSION}"));
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}
