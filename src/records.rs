//! Typed GeoIP2 and GeoLite2 records.
//!
//! Field names follow the MaxMind DB keys, and every field has a zero default
//! so a record is always fully populated. Sub-records that only differ by
//! edition live in the [`city`] and [`enterprise`] modules, the ones shared by
//! the City, Country and Enterprise editions live in [`country`].

use crate::edition::Capability;
use crate::project::{record, Record};

record! {
    /// Localized names keyed by the languages MaxMind publishes.
    pub struct Names {
        german: String = "de",
        english: String = "en",
        spanish: String = "es",
        french: String = "fr",
        japanese: String = "ja",
        brazilian_portuguese: String = "pt-BR",
        russian: String = "ru",
        simplified_chinese: String = "zh-CN",
    }
}

impl Names {
    /// Language codes carried by [`Names`].
    pub const LANGUAGES: [&'static str; 8] =
        ["de", "en", "es", "fr", "ja", "pt-BR", "ru", "zh-CN"];

    /// The name for a language code, if the code is one of [`Names::LANGUAGES`]
    /// and the name is non-empty.
    pub fn get(&self, language: &str) -> Option<&str> {
        let name = match language {
            "de" => &self.german,
            "en" => &self.english,
            "es" => &self.spanish,
            "fr" => &self.french,
            "ja" => &self.japanese,
            "pt-BR" => &self.brazilian_portuguese,
            "ru" => &self.russian,
            "zh-CN" => &self.simplified_chinese,
            _ => return None,
        };
        (!name.is_empty()).then_some(name.as_str())
    }

    /// First non-empty name among `languages`, in order.
    pub fn preferred<'a, I>(&self, languages: I) -> Option<&str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        languages.into_iter().find_map(|lang| self.get(lang))
    }

    pub fn is_empty(&self) -> bool {
        Self::LANGUAGES.iter().all(|lang| self.get(lang).is_none())
    }
}

/// Sub-records shared by the Country, City and Enterprise editions.
pub mod country {
    use crate::project::record;

    use super::Names;

    record! {
        pub struct Continent {
            code: String = "code",
            geoname_id: u32 = "geoname_id",
            names: Names = "names",
        }
    }

    record! {
        pub struct Country {
            geoname_id: u32 = "geoname_id",
            is_in_european_union: bool = "is_in_european_union",
            iso_code: String = "iso_code",
            names: Names = "names",
        }
    }

    record! {
        /// The country represented by users of the address, e.g. a military
        /// base abroad.
        pub struct RepresentedCountry {
            geoname_id: u32 = "geoname_id",
            is_in_european_union: bool = "is_in_european_union",
            iso_code: String = "iso_code",
            names: Names = "names",
            represented_type: String = "type",
        }
    }

    record! {
        pub struct Traits {
            is_anonymous_proxy: bool = "is_anonymous_proxy",
            is_anycast: bool = "is_anycast",
            is_satellite_provider: bool = "is_satellite_provider",
        }
    }
}

/// Sub-records of the City edition.
pub mod city {
    use crate::project::record;

    use super::Names;

    record! {
        pub struct City {
            geoname_id: u32 = "geoname_id",
            names: Names = "names",
        }
    }

    record! {
        pub struct Location {
            accuracy_radius: u16 = "accuracy_radius",
            latitude: f64 = "latitude",
            longitude: f64 = "longitude",
            metro_code: u16 = "metro_code",
            time_zone: String = "time_zone",
        }
    }

    record! {
        pub struct Postal {
            code: String = "code",
        }
    }

    record! {
        pub struct Subdivision {
            geoname_id: u32 = "geoname_id",
            iso_code: String = "iso_code",
            names: Names = "names",
        }
    }
}

/// Sub-records of the Enterprise edition, which adds confidence scores and a
/// much richer set of traits.
pub mod enterprise {
    use crate::project::record;

    use super::Names;

    record! {
        pub struct City {
            confidence: u8 = "confidence",
            geoname_id: u32 = "geoname_id",
            names: Names = "names",
        }
    }

    record! {
        pub struct Country {
            confidence: u8 = "confidence",
            geoname_id: u32 = "geoname_id",
            is_in_european_union: bool = "is_in_european_union",
            iso_code: String = "iso_code",
            names: Names = "names",
        }
    }

    record! {
        pub struct Postal {
            code: String = "code",
            confidence: u8 = "confidence",
        }
    }

    record! {
        pub struct Subdivision {
            confidence: u8 = "confidence",
            geoname_id: u32 = "geoname_id",
            iso_code: String = "iso_code",
            names: Names = "names",
        }
    }

    record! {
        pub struct Traits {
            autonomous_system_number: u32 = "autonomous_system_number",
            autonomous_system_organization: String = "autonomous_system_organization",
            connection_type: String = "connection_type",
            domain: String = "domain",
            is_anonymous_proxy: bool = "is_anonymous_proxy",
            is_anycast: bool = "is_anycast",
            is_legitimate_proxy: bool = "is_legitimate_proxy",
            is_satellite_provider: bool = "is_satellite_provider",
            isp: String = "isp",
            mobile_country_code: String = "mobile_country_code",
            mobile_network_code: String = "mobile_network_code",
            organization: String = "organization",
            static_ip_score: f64 = "static_ip_score",
            user_type: String = "user_type",
        }
    }
}

record! {
    /// GeoIP2/GeoLite2 City record.
    pub struct City {
        city: city::City = "city",
        continent: country::Continent = "continent",
        country: country::Country = "country",
        location: city::Location = "location",
        postal: city::Postal = "postal",
        registered_country: country::Country = "registered_country",
        represented_country: country::RepresentedCountry = "represented_country",
        /// Most general first, e.g. England before Westminster.
        subdivisions: Vec<city::Subdivision> = "subdivisions",
        traits: country::Traits = "traits",
    }
}

record! {
    /// GeoIP2/GeoLite2 Country record.
    pub struct Country {
        continent: country::Continent = "continent",
        country: country::Country = "country",
        registered_country: country::Country = "registered_country",
        represented_country: country::RepresentedCountry = "represented_country",
        traits: country::Traits = "traits",
    }
}

record! {
    /// GeoIP2 Enterprise record.
    pub struct Enterprise {
        city: enterprise::City = "city",
        continent: country::Continent = "continent",
        country: enterprise::Country = "country",
        location: city::Location = "location",
        postal: enterprise::Postal = "postal",
        registered_country: enterprise::Country = "registered_country",
        represented_country: country::RepresentedCountry = "represented_country",
        subdivisions: Vec<enterprise::Subdivision> = "subdivisions",
        traits: enterprise::Traits = "traits",
    }
}

record! {
    /// GeoIP2 Anonymous IP record.
    pub struct AnonymousIp {
        is_anonymous: bool = "is_anonymous",
        is_anonymous_vpn: bool = "is_anonymous_vpn",
        is_hosting_provider: bool = "is_hosting_provider",
        is_public_proxy: bool = "is_public_proxy",
        is_residential_proxy: bool = "is_residential_proxy",
        is_tor_exit_node: bool = "is_tor_exit_node",
    }
}

record! {
    /// GeoLite2 ASN record.
    pub struct Asn {
        autonomous_system_number: u32 = "autonomous_system_number",
        autonomous_system_organization: String = "autonomous_system_organization",
    }
}

record! {
    /// GeoIP2 Connection-Type record.
    pub struct ConnectionType {
        connection_type: String = "connection_type",
    }
}

record! {
    /// GeoIP2 Domain record.
    pub struct Domain {
        domain: String = "domain",
    }
}

record! {
    /// GeoIP2 ISP record.
    pub struct Isp {
        autonomous_system_number: u32 = "autonomous_system_number",
        autonomous_system_organization: String = "autonomous_system_organization",
        isp: String = "isp",
        mobile_country_code: String = "mobile_country_code",
        mobile_network_code: String = "mobile_network_code",
        organization: String = "organization",
    }
}

impl Record for City {
    const CAPABILITY: Capability = Capability::City;
}

impl Record for Country {
    const CAPABILITY: Capability = Capability::Country;
}

impl Record for Enterprise {
    const CAPABILITY: Capability = Capability::Enterprise;
}

impl Record for AnonymousIp {
    const CAPABILITY: Capability = Capability::AnonymousIp;
}

impl Record for Asn {
    const CAPABILITY: Capability = Capability::Asn;
}

impl Record for ConnectionType {
    const CAPABILITY: Capability = Capability::ConnectionType;
}

impl Record for Domain {
    const CAPABILITY: Capability = Capability::Domain;
}

impl Record for Isp {
    const CAPABILITY: Capability = Capability::Isp;
}
