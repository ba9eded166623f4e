//! Constants shared across the crate.

/// Length of the truncated hash used by [`ObjectHash`](crate::util::hash::ObjectHash).
pub const OBJ_HASH_PREFIX_LEN: usize = 20;

/// Length of the hash suffix appended to nested logical ids.
pub const LOGICAL_ID_HASH_LEN: usize = 8;

/// Prefix of identities generated for anonymous builders.
pub const ANONYMOUS_IDENTITY_PREFIX: &str = "Resource";

/// Separates the prefix from the counter in generated identities. Explicit
/// identities may not contain it, so the two namespaces never meet.
pub const GENERATED_IDENTITY_MARKER: char = '#';

/// Directory synthesized templates are written to by default.
pub const DEFAULT_OUT_DIR: &str = "purestack.out";

/// Summary file written next to the templates.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Suffix of each stack's template file.
pub const TEMPLATE_SUFFIX: &str = ".template.json";

/// Version label used when none is configured.
pub const DEFAULT_VSN: &str = "latest";

/// Domain used when none is configured.
pub const DEFAULT_DOMAIN: &str = "example.com";

pub const ENV_VSN: &str = "PURESTACK_VSN";
pub const ENV_DOMAIN: &str = "PURESTACK_DOMAIN";
pub const ENV_ACCOUNT: &str = "CDK_DEFAULT_ACCOUNT";
pub const ENV_REGION: &str = "CDK_DEFAULT_REGION";
