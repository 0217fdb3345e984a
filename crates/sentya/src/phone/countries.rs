//! Dialing-code catalogue.

/// A country and its international dialing code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Country {
    /// Dialing code including the leading `+`.
    pub code: &'static str,
    /// Country name as displayed.
    pub name: &'static str,
    /// ISO 3166-1 alpha-2 code.
    pub iso: &'static str,
}

impl Country {
    /// Create a catalogue entry.
    #[must_use]
    pub const fn new(code: &'static str, name: &'static str, iso: &'static str) -> Self {
        Self { code, name, iso }
    }

    /// Regional-indicator flag emoji derived from the ISO code.
    #[must_use]
    pub fn flag(&self) -> String {
        self.iso
            .chars()
            .map(|c| u32::from(c.to_ascii_uppercase()) - u32::from('A'))
            .filter_map(|offset| char::from_u32(0x1F1E6 + offset))
            .collect()
    }
}

/// Every known country, in catalogue order.
pub const COUNTRIES: &[Country] = &[
    Country::new("+34", "España", "ES"),
    Country::new("+33", "Francia", "FR"),
    Country::new("+39", "Italia", "IT"),
    Country::new("+49", "Alemania", "DE"),
    Country::new("+351", "Portugal", "PT"),
    Country::new("+44", "Reino Unido", "GB"),
    Country::new("+1", "Estados Unidos", "US"),
    Country::new("+1", "Canadá", "CA"),
    Country::new("+52", "México", "MX"),
    Country::new("+54", "Argentina", "AR"),
    Country::new("+55", "Brasil", "BR"),
    Country::new("+56", "Chile", "CL"),
    Country::new("+57", "Colombia", "CO"),
    Country::new("+58", "Venezuela", "VE"),
    Country::new("+51", "Perú", "PE"),
    Country::new("+593", "Ecuador", "EC"),
    Country::new("+595", "Paraguay", "PY"),
    Country::new("+598", "Uruguay", "UY"),
    Country::new("+591", "Bolivia", "BO"),
    Country::new("+31", "Países Bajos", "NL"),
    Country::new("+32", "Bélgica", "BE"),
    Country::new("+41", "Suiza", "CH"),
    Country::new("+43", "Austria", "AT"),
    Country::new("+45", "Dinamarca", "DK"),
    Country::new("+46", "Suecia", "SE"),
    Country::new("+47", "Noruega", "NO"),
    Country::new("+48", "Polonia", "PL"),
    Country::new("+420", "República Checa", "CZ"),
    Country::new("+421", "Eslovaquia", "SK"),
    Country::new("+36", "Hungría", "HU"),
    Country::new("+40", "Rumanía", "RO"),
    Country::new("+359", "Bulgaria", "BG"),
    Country::new("+30", "Grecia", "GR"),
    Country::new("+90", "Turquía", "TR"),
];

/// ISO codes of the countries listed first in pickers.
const POPULAR: &[&str] = &["ES", "FR", "IT", "DE", "PT", "GB", "US", "MX"];

/// The countries shown at the top of a picker.
pub fn popular() -> impl Iterator<Item = &'static Country> {
    COUNTRIES.iter().filter(|c| is_popular(c))
}

/// Whether a country belongs to the popular set.
#[must_use]
pub fn is_popular(country: &Country) -> bool {
    POPULAR.contains(&country.iso)
}

/// Look up the first country using a dialing code.
#[must_use]
pub fn by_code(code: &str) -> Option<&'static Country> {
    COUNTRIES.iter().find(|c| c.code == code)
}

/// Search the catalogue.
///
/// A blank query returns every country outside the popular set. Otherwise a
/// country matches when its name or ISO code contains the query (ignoring
/// case) or its dialing code contains it verbatim.
#[must_use]
pub fn search(query: &str) -> Vec<&'static Country> {
    let query = query.trim();
    if query.is_empty() {
        return COUNTRIES.iter().filter(|c| !is_popular(c)).collect();
    }

    let needle = query.to_lowercase();
    COUNTRIES
        .iter()
        .filter(|c| {
            c.name.to_lowercase().contains(&needle)
                || c.code.contains(query)
                || c.iso.to_lowercase().contains(&needle)
        })
        .collect()
}
