//! Randomized browser identities for page fetches

use rand::seq::SliceRandom;
use rand::Rng;

const WINDOWS_PLATFORMS: &[&str] = &[
    "Windows NT 10.0; Win64; x64",
    "Windows NT 10.0; WOW64",
    "Windows NT 6.1; Win64; x64",
];

const MAC_PLATFORMS: &[&str] = &[
    "Macintosh; Intel Mac OS X 10_15_7",
    "Macintosh; Intel Mac OS X 13_6",
    "Macintosh; Intel Mac OS X 14_4",
];

const LINUX_PLATFORMS: &[&str] = &[
    "X11; Linux x86_64",
    "X11; Ubuntu; Linux x86_64",
    "X11; Fedora; Linux x86_64",
];

#[derive(Clone, Copy)]
enum Browser {
    Chrome,
    Firefox,
    Safari,
    Edge,
}

const BROWSERS: &[Browser] = &[Browser::Chrome, Browser::Firefox, Browser::Safari, Browser::Edge];

/// Produce a plausible desktop browser `User-Agent` header value
///
/// The result depends only on `rng`, so a seeded generator gives a
/// reproducible identity.
pub fn random_user_agent<R: Rng + ?Sized>(rng: &mut R) -> String {
    let browser = *BROWSERS.choose(rng).unwrap_or(&Browser::Chrome);

    match browser {
        Browser::Chrome => {
            let platform = any_platform(rng);
            let major = rng.gen_range(110..=131);
            format!(
                "Mozilla/5.0 ({platform}) AppleWebKit/537.36 (KHTML, like Gecko) \
                 Chrome/{major}.0.{}.{} Safari/537.36",
                rng.gen_range(4000..=6800),
                rng.gen_range(0..=200)
            )
        }
        Browser::Firefox => {
            let platform = any_platform(rng);
            let major = rng.gen_range(110..=133);
            format!("Mozilla/5.0 ({platform}; rv:{major}.0) Gecko/20100101 Firefox/{major}.0")
        }
        Browser::Safari => {
            let platform = pick(rng, MAC_PLATFORMS);
            let major = rng.gen_range(15..=17);
            let minor = rng.gen_range(0..=6);
            format!(
                "Mozilla/5.0 ({platform}) AppleWebKit/605.1.15 (KHTML, like Gecko) \
                 Version/{major}.{minor} Safari/605.1.15"
            )
        }
        Browser::Edge => {
            let platform = pick(rng, WINDOWS_PLATFORMS);
            let major = rng.gen_range(110..=131);
            format!(
                "Mozilla/5.0 ({platform}) AppleWebKit/537.36 (KHTML, like Gecko) \
                 Chrome/{major}.0.0.0 Safari/537.36 Edg/{major}.0.{}.{}",
                rng.gen_range(1500..=2900),
                rng.gen_range(0..=120)
            )
        }
    }
}

fn any_platform<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    let family = [WINDOWS_PLATFORMS, MAC_PLATFORMS, LINUX_PLATFORMS];
    let platforms = family.choose(rng).copied().unwrap_or(WINDOWS_PLATFORMS);
    pick(rng, platforms)
}

fn pick<R: Rng + ?Sized>(rng: &mut R, items: &[&'static str]) -> &'static str {
    items.choose(rng).copied().unwrap_or(items[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let a = random_user_agent(&mut StdRng::seed_from_u64(42));
        let b = random_user_agent(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_looks_like_a_browser() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let ua = random_user_agent(&mut rng);
            assert!(ua.starts_with("Mozilla/5.0 ("), "{ua}");
            assert!(!ua.contains('\n'));
            assert!(
                ["Chrome/", "Firefox/", "Safari/"].iter().any(|b| ua.contains(b)),
                "{ua}"
            );
        }
    }

    #[test]
    fn test_identities_vary() {
        let mut rng = StdRng::seed_from_u64(1);
        let agents: std::collections::HashSet<String> =
            (0..50).map(|_| random_user_agent(&mut rng)).collect();
        assert!(agents.len() > 10);
    }
}
