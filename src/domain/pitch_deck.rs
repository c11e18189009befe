/// Maps expo-name fragments to pitch deck URLs.
///
/// Lookup is substring containment on the lowercased expo label; the first
/// matching fragment wins, so the entry order is part of the contract.
pub struct PitchDeckDirectory {
    entries: Vec<(String, String)>,
}

impl PitchDeckDirectory {
    pub fn new<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(fragment, url)| (fragment.into(), url.into()))
                .collect(),
        }
    }

    /// The production expo directory.
    pub fn standard() -> Self {
        Self::new([
            (
                "isle of man",
                "https://b2bgrowthexpo.com/isle-of-man-exhibitor-pitch-deck/",
            ),
            (
                "london expo",
                "https://b2bgrowthexpo.com/london-exhibitor-pitch-deck/",
            ),
            (
                "cardiff",
                "https://b2bgrowthexpo.com/cardiff-exhibitor-pitch-deck/",
            ),
            (
                "business innovation",
                "https://b2bgrowthexpo.com/business-innovation-expo-pack/",
            ),
            (
                "bournemouth",
                "https://b2bgrowthexpo.com/bournemouth-exhibitor-pitch-deck/",
            ),
            (
                "corporate wellbeing",
                "https://b2bgrowthexpo.com/corporate-wellbeing-expo-pitch-deck/",
            ),
            (
                "milton keynes",
                "https://b2bgrowthexpo.com/milton-keynes-exhibitor-pitch-deck/",
            ),
            (
                "dubai",
                "https://b2bgrowthexpo.com/dubai-exhibitor-pitch-deck/",
            ),
            (
                "birmingham",
                "https://b2bgrowthexpo.com/birmingham-exhibitor-pitch-deck/",
            ),
            (
                "southampton",
                "https://b2bgrowthexpo.com/southampton-exhibitor-pitch-deck-2/",
            ),
            (
                "portsmouth",
                "https://b2bgrowthexpo.com/portsmouth-exhibitor-pitch-deck/",
            ),
            (
                "basingstoke",
                "https://b2bgrowthexpo.com/basingstoke-exhibitor-pitch-deck/",
            ),
        ])
    }

    pub fn resolve(&self, expo_label: &str) -> Option<&str> {
        let label = expo_label.to_lowercase();
        self.entries
            .iter()
            .find(|(fragment, _)| label.contains(fragment.as_str()))
            .map(|(_, url)| url.as_str())
    }
}
