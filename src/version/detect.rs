//! Version detection from download URLs and VCS tags.
//!
//! Detection walks a fixed, ordered table of patterns and returns the first
//! capture. More specific shapes come first (GitHub tarballs, Erlang
//! releases, `_`-separated versions, revision suffixes) and the loose
//! "any dotted number in the URL" fallback comes last. Each pattern matches
//! either the archive stem (`foo-1.2.3` for `.../foo-1.2.3.tar.gz`) or the
//! whole URL.

use super::Version;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subject {
    /// File name without directory or archive extension.
    Stem,
    /// The whole URL, decoded after splitting off the query.
    Url,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fixup {
    Keep,
    /// `1_39_0` -> `1.39.0`
    UnderscoresToDots,
    /// Capture must be a real calendar date.
    Date,
}

struct Pattern {
    name: &'static str,
    subject: Subject,
    regex: Regex,
    fixup: Fixup,
}

impl Pattern {
    fn new(name: &'static str, subject: Subject, pattern: &str, fixup: Fixup) -> Self {
        Self {
            name,
            subject,
            regex: Regex::new(pattern).expect("version pattern must compile"),
            fixup,
        }
    }

    fn capture(&self, stem: &str, url: &str) -> Option<String> {
        let haystack = match self.subject {
            Subject::Stem => stem,
            Subject::Url => url,
        };
        let found = self.regex.captures(haystack)?.get(1)?.as_str();

        match self.fixup {
            Fixup::Keep => Some(found.to_string()),
            Fixup::UnderscoresToDots => Some(found.replace('_', ".")),
            Fixup::Date => NaiveDate::parse_from_str(found, "%Y-%m-%d")
                .ok()
                .map(|_| found.to_string()),
        }
    }
}

static PATTERNS: LazyLock<Vec<Pattern>> = LazyLock::new(|| {
    use Fixup::*;
    use Subject::*;

    vec![
        // ltopers-v2017-04-14.tar.gz
        Pattern::new("date", Stem, r"-v?(\d{4}-\d{2}-\d{2})", Date),
        // github.com/foo/bar/tarball/v1.2.3, .../tarball/libnet-1.1.4,
        // .../tarball/v0.2.5-1, .../zipball/1.93_02
        Pattern::new(
            "github-tarball",
            Url,
            r"github\.com/.+/(?:zip|tar)ball/(?:v|\w+-)?((?:\d+[-._])+\d*)$",
            Keep,
        ),
        // github.com/erlang/otp/tarball/OTP_R15B01
        Pattern::new("erlang", Stem, r"[-_]([Rr]\d+[AaBb]\d*(?:-\d+)?)", Keep),
        // bar_1.2.3_linux_x86_64, bar-1.2.3-darwin-arm64
        Pattern::new(
            "platform-suffix",
            Stem,
            r"[-_v]((?:\d+\.)+\d+)[-_.](?i:(?:apple-)?darwin|linux|macos|mac|osx|windows|win|freebsd)",
            Keep,
        ),
        // mtools-4.0.18-1.i686.rpm, libtasn1-2.8-x86.zip, mtools_4.0.18_i386.deb,
        // foo-1.2.3-aarch64.tar.gz, foo_1.2.3_amd64.deb
        Pattern::new(
            "arch-suffix",
            Stem,
            r"[-_]((?:\d+\.)+\d+(?:-\d+)?)[-_.](?:x86_64|amd64|arm64|aarch64|i[36]86|x86|x64(?:[-_](?:32|64))?|noarch)$",
            Keep,
        ),
        // boost_1_39_0
        Pattern::new("underscores", Stem, r"((?:\d+_)+\d+)$", UnderscoresToDots),
        // foobar-4.5.1-1, unrtf_0.20.4-1, ruby-1.9.1-p243
        Pattern::new(
            "revision-suffix",
            Stem,
            r"[-_]((?:\d+\.)*\d+\.\d+-(?:p|rc|RC)?\d+)(?:[-._](?i:bin|dist|stable|src|sources?|final|full))?$",
            Keep,
        ),
        // waf.io/waf-1.8.12, codeload.github.com/gsamokovarov/jump/tar.gz/v0.7.1
        Pattern::new("no-extension", Url, r"[-v]((?:\d+\.)*\d+)$", Keep),
        // lame-398-1
        Pattern::new("dashed-pair", Stem, r"-(\d+-\d+)", Keep),
        // foobar-4.5.1
        Pattern::new("dotted", Stem, r"-((?:\d+\.)*\d+)$", Keep),
        // foobar-4.5.1.post1
        Pattern::new("post-release", Stem, r"-((?:\d+\.)*\d+\.post\d+)$", Keep),
        // foobar-4.5.1b, foobar-4.5.1rc2
        Pattern::new("letter-suffix", Stem, r"-((?:\d+\.)*\d+(?:[abc]|rc|RC)\d*)$", Keep),
        // foobar-4.5.0-alpha5, foobar-4.5.0-beta11, foobar-4.50-beta
        Pattern::new(
            "dashed-prerelease",
            Stem,
            r"-((?:\d+\.)*\d+-(?:alpha|beta|rc)\d*)$",
            Keep,
        ),
        // libidn-1.29-win64.zip, libmicrohttpd-0.9.17-w32.zip
        Pattern::new("windows", Stem, r"-(\d+\.\d+(?:\.\d+)?)-w(?:in)?(?:32|64)$", Keep),
        // opam.ocaml.org/archives/lablgtk.2.18.3+opam.tar.gz
        Pattern::new("opam", Stem, r"\.(\d+\.\d+(?:\.\d+)?)\+opam$", Keep),
        // cli-1.3.0-beta.1.tgz, dmd/archive/v2.074.0-rc1.tar.gz
        Pattern::new(
            "prerelease",
            Stem,
            r"[-.vV]?((?:\d+\.)+\d+[-_.]?(?i:alpha|beta|pre|rc)\.?\d{0,2})",
            Keep,
        ),
        // foobar4.5.1
        Pattern::new("trailing-number", Stem, r"((?:\d+\.)*\d+)$", Keep),
        // foobar-4.5.0-bin
        Pattern::new(
            "dist-suffix",
            Stem,
            r"[-vV]((?:\d+\.)+\d+[abc]?)[-._](?i:bin|dist|stable|src|sources?|final|full)$",
            Keep,
        ),
        // antlr-3.4-complete.jar, presto-cli-0.181-executable.jar
        Pattern::new("dash-infix", Stem, r"-((?:\d+\.)+\d+)-", Keep),
        // jpegsrc.v8d.tar.gz
        Pattern::new("dot-v", Stem, r"\.v(\d+[a-z]?)", Keep),
        // secure.php.net/get/php-7.1.10.tar.bz2/from/this/mirror
        Pattern::new(
            "anywhere",
            Url,
            r"[-.vV]?((?:\d+\.)+\d+(?:[-_.]?(?i:alpha|beta|pre|rc)\.?\d{0,2})?)",
            Keep,
        ),
    ]
});

static ARCHIVE_EXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\.(?:tar|cpio|pax)\.(?:gz|bz2|lz|xz|zst|Z))$").expect("archive pattern must compile")
});

// A trailing `1.2...` with no further dot is a version, not an extension.
static VERSION_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+\.\d+[^.]*$").expect("tail pattern must compile"));

static SOURCEFORGE_DOWNLOAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:sourceforge\.net|sf\.net)/.*/download$").expect("sourceforge pattern must compile")
});

/// Detect a version from a download URL or, when given, a VCS tag.
///
/// The tag is tried first; if it yields nothing the URL is used. Returns
/// [`Version::NULL`] when no pattern matches.
///
/// ```
/// use brewkit::Version;
///
/// let version = Version::detect("https://example.com/foo-1.21.tar.gz", None);
/// assert_eq!(version, Version::parse("1.21"));
/// assert!(version.is_detected());
///
/// let tagged = Version::detect("https://github.com/foo/bar.git", Some("v2.0.1"));
/// assert_eq!(tagged.to_string(), "2.0.1");
/// ```
pub fn detect(url: &str, tag: Option<&str>) -> Version {
    if let Some(tag) = tag.filter(|t| !t.trim().is_empty()) {
        let from_tag = parse_source(tag);
        if !from_tag.is_null() {
            return from_tag;
        }
    }
    parse_source(url)
}

fn parse_source(source: &str) -> Version {
    match detect_str(source) {
        Some(found) => Version::parse(&found).mark_detected(),
        None => Version::NULL,
    }
}

/// Run the pattern table and return the raw captured version text.
///
/// The query is split off before anything is percent-decoded, so escaped
/// `?`, `&` or `/` never change the URL's structure.
pub fn detect_str(source: &str) -> Option<String> {
    let source = source.trim();
    let (path, query) = match source.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (source, None),
    };

    let stem = stem(&file_name(path, query));
    let url = match query {
        Some(query) => format!("{}?{}", percent_decode(path), percent_decode(query)),
        None => percent_decode(path),
    };

    PATTERNS.iter().find_map(|pattern| {
        let found = pattern.capture(&stem, &url)?;
        trace!(pattern = pattern.name, %found, source, "detected version");
        Some(found)
    })
}

/// The decoded name of the downloaded file. A query value that looks like a
/// file path (`?filepath=org/foo/1.3/foo-1.3.jar`) wins over the URL path.
fn file_name(path: &str, query: Option<&str>) -> String {
    let from_query = query
        .into_iter()
        .flat_map(|query| query.split('&'))
        .filter_map(|pair| pair.split_once('=').map(|(_, value)| percent_decode(value)))
        .filter_map(|value| {
            let name = value.rsplit('/').next().unwrap_or_default();
            (name.contains('.') && name.chars().any(|c| c.is_ascii_digit()))
                .then(|| name.to_string())
        })
        .last();
    if let Some(name) = from_query {
        return name;
    }

    let path = path.trim_end_matches('/');
    let path = if SOURCEFORGE_DOWNLOAD.is_match(path) {
        path.trim_end_matches("/download")
    } else {
        path
    };
    percent_decode(path.rsplit('/').next().unwrap_or(path))
}

fn stem(name: &str) -> String {
    let ext = extname(name);
    name[..name.len() - ext.len()].to_string()
}

fn extname(name: &str) -> &str {
    if let Some(m) = ARCHIVE_EXT.find(name) {
        return m.as_str();
    }
    if VERSION_TAIL.is_match(name) && !name.ends_with(".7z") {
        return "";
    }
    match name.rfind('.') {
        Some(0) | None => "",
        Some(pos) => &name[pos..],
    }
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detected(url: &str) -> String {
        detect(url, None).to_string()
    }

    #[test]
    fn test_plain_tarball() {
        assert_eq!(detected("https://example.com/foo-1.21.tar.gz"), "1.21");
        assert_eq!(detected("https://example.com/foo-4.5.1.tar.bz2"), "4.5.1");
        assert_eq!(detected("https://example.com/foo-1.2.3.4.tar.xz"), "1.2.3.4");
    }

    #[test]
    fn test_github_tarballs() {
        assert_eq!(detected("https://github.com/foo/bar/tarball/v1.2.3"), "1.2.3");
        assert_eq!(
            detected("https://github.com/sam-github/libnet/tarball/libnet-1.1.4"),
            "1.1.4"
        );
        assert_eq!(detected("https://github.com/isaacs/npm/tarball/v0.2.5-1"), "0.2.5-1");
        assert_eq!(detected("https://github.com/petdance/ack/tarball/1.93_02"), "1.93_02");
    }

    #[test]
    fn test_github_release_asset_with_platform() {
        assert_eq!(
            detected("https://github.com/o/r/releases/download/v1.2.3/bar_1.2.3_linux_x86_64.tar.gz"),
            "1.2.3"
        );
        assert_eq!(
            detected("https://github.com/o/r/releases/download/v0.9.0/tool-0.9.0-darwin-arm64.zip"),
            "0.9.0"
        );
    }

    #[test]
    fn test_erlang_style() {
        assert_eq!(detected("https://github.com/erlang/otp/tarball/OTP_R15B01"), "R15B01");
        assert_eq!(detected("https://erlang.org/download/otp_src_R13B04.tar.gz"), "R13B04");
    }

    #[test]
    fn test_underscored() {
        assert_eq!(detected("https://example.com/boost_1_39_0.tar.bz2"), "1.39.0");
    }

    #[test]
    fn test_revision_suffixes() {
        assert_eq!(detected("https://example.com/foobar-4.5.1-1.tar.gz"), "4.5.1-1");
        assert_eq!(detected("https://example.com/unrtf_0.20.4-1.tar.gz"), "0.20.4-1");
        assert_eq!(detected("https://example.com/ruby-1.9.1-p243.tar.gz"), "1.9.1-p243");
    }

    #[test]
    fn test_no_extension() {
        assert_eq!(detected("https://waf.io/waf-1.8.12"), "1.8.12");
        assert_eq!(
            detected("https://codeload.github.com/gsamokovarov/jump/tar.gz/v0.7.1"),
            "0.7.1"
        );
    }

    #[test]
    fn test_prereleases() {
        assert_eq!(detected("https://example.com/foobar-4.5.1b.tar.gz"), "4.5.1b");
        assert_eq!(detected("https://example.com/foobar-4.5.0-beta11.tar.gz"), "4.5.0-beta11");
        assert_eq!(
            detected("https://registry.npmjs.org/@angular/cli/-/cli-1.3.0-beta.1.tgz"),
            "1.3.0-beta.1"
        );
        assert_eq!(
            detected("https://github.com/dlang/dmd/archive/v2.074.0-rc1.tar.gz"),
            "2.074.0-rc1"
        );
    }

    #[test]
    fn test_date_stamped() {
        assert_eq!(detected("https://example.com/ltopers-v2017-04-14.tar.gz"), "2017-04-14");
        // Not a calendar date, falls through to the dashed-pair rule
        assert_eq!(detected("https://example.com/foo-2017-13-45.tar.gz"), "2017-13");
    }

    #[test]
    fn test_mirror_suffixes() {
        assert_eq!(detected("https://ftpmirror.gnu.org/libidn/libidn-1.29-win64.zip"), "1.29");
        assert_eq!(
            detected("https://ftpmirror.gnu.org/libmicrohttpd/libmicrohttpd-0.9.17-w32.zip"),
            "0.9.17"
        );
        assert_eq!(
            detected("https://ftpmirror.gnu.org/mtools/mtools-4.0.18-1.i686.rpm"),
            "4.0.18-1"
        );
        assert_eq!(detected("https://ftpmirror.gnu.org/mtools/mtools_4.0.18_i386.deb"), "4.0.18");
        assert_eq!(
            detected("https://opam.ocaml.org/archives/lablgtk.2.18.3+opam.tar.gz"),
            "2.18.3"
        );
    }

    #[test]
    fn test_release_asset_arch_suffixes() {
        assert_eq!(detected("https://example.com/tool-2.3.1-1.x86_64.rpm"), "2.3.1-1");
        assert_eq!(detected("https://example.com/foo-1.2.3-x86_64.tar.gz"), "1.2.3");
        assert_eq!(detected("https://example.com/foo-1.2.3-aarch64.tar.gz"), "1.2.3");
        assert_eq!(detected("https://example.com/foo_1.2.3_amd64.deb"), "1.2.3");
        assert_eq!(detected("https://example.com/foo-0.4.1-1.noarch.rpm"), "0.4.1-1");
        assert_eq!(detected("https://example.com/foo-1.2.3-linux-amd64.tar.gz"), "1.2.3");
    }

    #[test]
    fn test_erlang_rule_only_reads_file_name() {
        assert_eq!(
            detected("https://example.com/mirror-r12a/pkg/foo-3.1.4.tar.gz"),
            "3.1.4"
        );
    }

    #[test]
    fn test_query_string_filename() {
        assert_eq!(
            detected(
                "https://search.maven.org/remotecontent?filepath=com/facebook/presto/presto-cli/0.181/presto-cli-0.181-executable.jar"
            ),
            "0.181"
        );
    }

    #[test]
    fn test_sourceforge_download() {
        assert_eq!(
            detected("https://sourceforge.net/projects/foo/files/foo-2.3.4.tar.gz/download"),
            "2.3.4"
        );
    }

    #[test]
    fn test_misc_shapes() {
        assert_eq!(detected("http://www.ijg.org/files/jpegsrc.v8d.tar.gz"), "8d");
        assert_eq!(detected("http://www.antlr.org/download/antlr-3.4-complete.jar"), "3.4");
        assert_eq!(
            detected("https://secure.php.net/get/php-7.1.10.tar.bz2/from/this/mirror"),
            "7.1.10"
        );
        assert_eq!(detected("https://example.com/lame-398-1.tar.gz"), "398-1");
    }

    #[test]
    fn test_percent_escapes_decoded() {
        assert_eq!(detected("https://example.com/foo%2D1.2.3.tar.gz"), "1.2.3");
        assert_eq!(
            detected("https://search.example.com/get?filepath=org%2Ffoo%2Ffoo-1.3.jar"),
            "1.3"
        );
    }

    #[test]
    fn test_escaped_question_mark_stays_in_path() {
        assert_eq!(
            detected("https://example.com/files/build%3F7/boost_1_39_0.tar.bz2"),
            "1.39.0"
        );
    }

    #[test]
    fn test_tag_preferred_over_url() {
        let version = detect("https://example.com/foo-1.0.tar.gz", Some("v2.5.0"));
        assert_eq!(version.to_string(), "2.5.0");
        assert!(version.is_detected());
    }

    #[test]
    fn test_unusable_tag_falls_back_to_url() {
        let version = detect("https://example.com/foo-1.0.tar.gz", Some("stable"));
        assert_eq!(version.to_string(), "1.0");
    }

    #[test]
    fn test_nothing_to_detect() {
        let version = detect("https://example.com/download", None);
        assert!(version.is_null());
        assert!(!version.is_detected());
    }

    #[test]
    fn test_extname() {
        assert_eq!(extname("foo-1.2.3.tar.gz"), ".tar.gz");
        assert_eq!(extname("foo-1.2.zip"), ".zip");
        assert_eq!(extname("foo-1.2.3"), "");
        assert_eq!(extname("presto-cli-0.181-executable.jar"), ".jar");
        assert_eq!(extname(".hidden"), "");
    }
}
