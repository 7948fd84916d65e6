//! Decides which repository tree entries are eligible for indexing.
//!
//! Pure classification over path strings: skip generated/vendored
//! directories, drop lock files, tooling config, and binary assets, and
//! include everything else (default-permissive on source and text files).

/// Directories that never contain indexable source
const SKIPPED_DIR_NAMES: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    ".next",
    "out",
    "coverage",
    ".turbo",
    ".vercel",
    ".cache",
    ".husky",
    ".vscode",
    ".idea",
];

/// Directory path suffixes skipped as whole subtrees
const SKIPPED_DIR_SUFFIXES: &[&str] = &["public/assets", "public/images"];

/// Exact file names excluded regardless of location
const EXCLUDED_FILE_NAMES: &[&str] = &[
    // Lock files
    "package-lock.json",
    "pnpm-lock.yaml",
    "yarn.lock",
    "bun.lockb",
    // Tooling / framework config
    "components.json",
    "next.config.js",
    "next.config.mjs",
    "next.config.ts",
    "postcss.config.js",
    "postcss.config.mjs",
    "tailwind.config.js",
    "tailwind.config.ts",
    ".eslintrc",
    ".eslintrc.js",
    ".eslintrc.json",
    "eslint.config.js",
    "eslint.config.mjs",
    ".prettierrc",
    ".prettierrc.json",
    ".prettierignore",
    "prettier.config.js",
    // Editor / npm / vercel config
    ".editorconfig",
    ".npmrc",
    ".nvmrc",
    "vercel.json",
    // Git metadata
    ".gitignore",
    ".gitattributes",
];

/// Binary and media extensions that cannot be embedded as text
const EXCLUDED_EXTENSIONS: &[&str] = &[
    // Images
    "png", "jpg", "jpeg", "gif", "ico", "svg", "webp", "bmp", "avif", "tiff",
    // Archives
    "zip", "tar", "gz", "tgz", "bz2", "xz", "rar", "7z",
    // Executables / compiled artifacts
    "exe", "dll", "so", "dylib", "bin", "wasm", "class", "pyc", "o", "a",
    // Fonts
    "woff", "woff2", "ttf", "otf", "eot",
    // Audio / video
    "mp3", "mp4", "wav", "ogg", "flac", "avi", "mov", "mkv", "webm",
    // Misc binary formats
    "pdf", "map",
];

/// Whether a directory subtree should be skipped during traversal.
pub fn should_skip_directory(path: &str) -> bool {
    let normalized = path.trim_end_matches('/');
    let name = normalized.rsplit('/').next().unwrap_or(normalized);

    if SKIPPED_DIR_NAMES.contains(&name) {
        return true;
    }

    SKIPPED_DIR_SUFFIXES
        .iter()
        .any(|suffix| normalized == *suffix || normalized.ends_with(&format!("/{suffix}")))
}

/// Whether a file is eligible for indexing.
pub fn should_include_file(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    let lower = name.to_lowercase();

    if EXCLUDED_FILE_NAMES.contains(&lower.as_str()) {
        return false;
    }

    // .env, .env.local, .env.production, ...
    if lower.starts_with(".env") {
        return false;
    }

    if lower.starts_with("license") || lower.starts_with("licence") || lower.starts_with("changelog")
    {
        return false;
    }

    let ext = lower.rsplit_once('.').map(|(_, e)| e).unwrap_or("");
    if EXCLUDED_EXTENSIONS.contains(&ext) {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_inclusion_table() {
        let cases: &[(&str, bool)] = &[
            // Source and text files are included
            ("src/app/page.tsx", true),
            ("src/main.rs", true),
            ("lib/utils.ts", true),
            ("README.md", true),
            ("docs/guide.md", true),
            ("Cargo.toml", true),
            ("package.json", true),
            ("tsconfig.json", true),
            ("schema.sql", true),
            ("Dockerfile", true),
            ("Makefile", true),
            ("scripts/deploy.sh", true),
            ("styles/globals.css", true),
            ("index.html", true),
            // Lock files
            ("package-lock.json", false),
            ("pnpm-lock.yaml", false),
            ("yarn.lock", false),
            ("bun.lockb", false),
            // Tooling config
            ("eslint.config.mjs", false),
            ("src/app/eslint.config.mjs", false),
            (".prettierrc", false),
            ("next.config.ts", false),
            ("postcss.config.mjs", false),
            ("components.json", false),
            (".editorconfig", false),
            (".npmrc", false),
            ("vercel.json", false),
            (".gitignore", false),
            (".gitattributes", false),
            // Env files
            (".env", false),
            (".env.local", false),
            (".env.production", false),
            // Binary / media
            ("image.png", false),
            ("logo.svg", false),
            ("assets/photo.jpeg", false),
            ("release.tar", false),
            ("bundle.zip", false),
            ("font.woff2", false),
            ("demo.mp4", false),
            ("manual.pdf", false),
            ("main.js.map", false),
            ("foo.map", false),
            // License and changelog variants
            ("LICENSE", false),
            ("LICENSE.md", false),
            ("LICENCE.txt", false),
            ("license", false),
            ("CHANGELOG.md", false),
            ("changelog", false),
        ];

        for (path, expected) in cases {
            assert_eq!(
                should_include_file(path),
                *expected,
                "should_include_file({path:?})"
            );
        }
    }

    #[test]
    fn test_directory_skip_table() {
        let cases: &[(&str, bool)] = &[
            ("node_modules", true),
            ("packages/web/node_modules", true),
            (".git", true),
            ("dist", true),
            ("build", true),
            (".next", true),
            ("out", true),
            ("coverage", true),
            (".turbo", true),
            (".vercel", true),
            (".cache", true),
            (".husky", true),
            (".vscode", true),
            (".idea", true),
            ("public/assets", true),
            ("public/images", true),
            ("apps/web/public/assets", true),
            // Regular directories recurse
            ("src", false),
            ("src/app", false),
            ("public", false),
            ("tests", false),
            ("outbound", false),
            ("distributed", false),
        ];

        for (path, expected) in cases {
            assert_eq!(
                should_skip_directory(path),
                *expected,
                "should_skip_directory({path:?})"
            );
        }
    }

    #[test]
    fn test_nested_path_only_checks_file_name() {
        assert!(should_include_file("deep/nested/dir/module.py"));
        assert!(!should_include_file("deep/nested/dir/yarn.lock"));
    }

    #[test]
    fn test_extensionless_files_are_included() {
        assert!(should_include_file("Procfile"));
        assert!(should_include_file("CODEOWNERS"));
    }
}
