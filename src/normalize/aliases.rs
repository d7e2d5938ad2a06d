//! Declared alias table for canonical fields
//!
//! Each canonical field has an ordered list of places a source may have put
//! its value. The canonicalizer takes the first alias that yields a present,
//! non-null value.

/// One place a canonical value may come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alias {
    /// `SectionMap[section][key]`
    Section {
        section: &'static str,
        key: &'static str,
    },
    /// Dotted path into the flat payload, e.g. `display.type`
    Field(&'static str),
}

const fn sec(section: &'static str, key: &'static str) -> Alias {
    Alias::Section { section, key }
}

const fn field(path: &'static str) -> Alias {
    Alias::Field(path)
}

/// Canonical fields resolved through the alias table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Id,
    Brand,
    Model,
    Slug,
    ReleaseDate,
    Status,
    Price,
    Currency,
    DisplayType,
    DisplaySize,
    DisplayResolution,
    DisplayRefreshRate,
    DisplayProtection,
    PlatformOs,
    PlatformOsVersion,
    PlatformChipset,
    PlatformCpu,
    PlatformGpu,
    MemoryRam,
    MemoryStorage,
    MemoryCardSlot,
    CameraRear,
    CameraFront,
    CameraVideo,
    BatteryCapacity,
    BatteryCharging,
    BatteryWirelessCharging,
}

impl CanonicalField {
    /// Output path of the field, as serialized
    pub fn path(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Brand => "brand",
            Self::Model => "model",
            Self::Slug => "slug",
            Self::ReleaseDate => "release_date",
            Self::Status => "status",
            Self::Price => "price",
            Self::Currency => "currency",
            Self::DisplayType => "display.type",
            Self::DisplaySize => "display.size",
            Self::DisplayResolution => "display.resolution",
            Self::DisplayRefreshRate => "display.refresh_rate",
            Self::DisplayProtection => "display.protection",
            Self::PlatformOs => "platform.os",
            Self::PlatformOsVersion => "platform.os_version",
            Self::PlatformChipset => "platform.chipset",
            Self::PlatformCpu => "platform.cpu",
            Self::PlatformGpu => "platform.gpu",
            Self::MemoryRam => "memory.ram",
            Self::MemoryStorage => "memory.storage",
            Self::MemoryCardSlot => "memory.card_slot",
            Self::CameraRear => "camera.rear",
            Self::CameraFront => "camera.front",
            Self::CameraVideo => "camera.video",
            Self::BatteryCapacity => "battery.capacity",
            Self::BatteryCharging => "battery.charging",
            Self::BatteryWirelessCharging => "battery.wireless_charging",
        }
    }

    /// Whether the field holds a list rather than a single value
    pub fn is_list(self) -> bool {
        matches!(self, Self::CameraRear | Self::CameraFront)
    }

    /// The ordered alias list for this field
    pub fn aliases(self) -> &'static [Alias] {
        FIELD_RULES
            .iter()
            .find(|rule| rule.field == self)
            .map(|rule| rule.aliases)
            .unwrap_or(&[])
    }
}

/// Ordered aliases for one canonical field
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: CanonicalField,
    pub aliases: &'static [Alias],
}

/// The alias table
///
/// Section titles and keys follow the usual spec-sheet layout ("Display" /
/// "Type"); flat field names cover the common REST payload spellings.
pub const FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        field: CanonicalField::Id,
        aliases: &[field("id"), field("device_id"), field("slug")],
    },
    FieldRule {
        field: CanonicalField::Brand,
        aliases: &[
            field("brand"),
            field("manufacturer"),
            field("brand_name"),
            field("brand.name"),
        ],
    },
    FieldRule {
        field: CanonicalField::Model,
        aliases: &[field("model"), field("phone_name"), field("model_name")],
    },
    FieldRule {
        field: CanonicalField::Slug,
        aliases: &[field("slug"), field("phone_slug")],
    },
    FieldRule {
        field: CanonicalField::ReleaseDate,
        aliases: &[
            field("release_date"),
            field("release"),
            field("released"),
            sec("Launch", "Announced"),
            sec("Launch", "Released"),
        ],
    },
    FieldRule {
        field: CanonicalField::Status,
        aliases: &[field("status"), sec("Launch", "Status")],
    },
    FieldRule {
        field: CanonicalField::Price,
        aliases: &[field("price"), field("price.amount"), sec("Misc", "Price")],
    },
    FieldRule {
        field: CanonicalField::Currency,
        aliases: &[
            field("currency"),
            field("price.currency"),
            field("price_currency"),
        ],
    },
    FieldRule {
        field: CanonicalField::DisplayType,
        aliases: &[
            sec("Display", "Type"),
            sec("Display", "Technology"),
            field("display.type"),
            field("display_type"),
            field("screen.type"),
        ],
    },
    FieldRule {
        field: CanonicalField::DisplaySize,
        aliases: &[
            sec("Display", "Size"),
            field("display.size"),
            field("display_size"),
            field("screen_size"),
            field("display"),
            field("screen"),
        ],
    },
    FieldRule {
        field: CanonicalField::DisplayResolution,
        aliases: &[
            sec("Display", "Resolution"),
            field("display.resolution"),
            field("resolution"),
        ],
    },
    FieldRule {
        field: CanonicalField::DisplayRefreshRate,
        aliases: &[
            sec("Display", "Refresh rate"),
            field("display.refresh_rate"),
            field("refresh_rate"),
        ],
    },
    FieldRule {
        field: CanonicalField::DisplayProtection,
        aliases: &[sec("Display", "Protection"), field("display.protection")],
    },
    FieldRule {
        field: CanonicalField::PlatformOs,
        aliases: &[sec("Platform", "OS"), field("platform.os"), field("os")],
    },
    FieldRule {
        field: CanonicalField::PlatformOsVersion,
        aliases: &[field("platform.os_version"), field("os_version")],
    },
    FieldRule {
        field: CanonicalField::PlatformChipset,
        aliases: &[
            sec("Platform", "Chipset"),
            field("platform.chipset"),
            field("chipset"),
            field("soc"),
        ],
    },
    FieldRule {
        field: CanonicalField::PlatformCpu,
        aliases: &[sec("Platform", "CPU"), field("platform.cpu"), field("cpu")],
    },
    FieldRule {
        field: CanonicalField::PlatformGpu,
        aliases: &[sec("Platform", "GPU"), field("platform.gpu"), field("gpu")],
    },
    FieldRule {
        field: CanonicalField::MemoryRam,
        aliases: &[sec("Memory", "RAM"), field("memory.ram"), field("ram")],
    },
    FieldRule {
        field: CanonicalField::MemoryStorage,
        aliases: &[
            sec("Memory", "Internal"),
            sec("Memory", "Storage"),
            field("memory.storage"),
            field("storage"),
        ],
    },
    FieldRule {
        field: CanonicalField::MemoryCardSlot,
        aliases: &[
            sec("Memory", "Card slot"),
            field("memory.card_slot"),
            field("card_slot"),
        ],
    },
    FieldRule {
        field: CanonicalField::CameraRear,
        aliases: &[
            sec("Main Camera", "Single"),
            sec("Main Camera", "Dual"),
            sec("Main Camera", "Triple"),
            sec("Main Camera", "Quad"),
            sec("Main Camera", "Penta"),
            field("camera.rear"),
            field("rear_camera"),
            field("main_camera"),
            field("camera"),
        ],
    },
    FieldRule {
        field: CanonicalField::CameraFront,
        aliases: &[
            sec("Selfie camera", "Single"),
            sec("Selfie camera", "Dual"),
            field("camera.front"),
            field("front_camera"),
            field("selfie_camera"),
        ],
    },
    FieldRule {
        field: CanonicalField::CameraVideo,
        aliases: &[
            sec("Main Camera", "Video"),
            field("camera.video"),
            field("video"),
        ],
    },
    FieldRule {
        field: CanonicalField::BatteryCapacity,
        aliases: &[
            sec("Battery", "Capacity"),
            sec("Battery", "Type"),
            field("battery.capacity"),
            field("battery_capacity"),
            field("battery"),
        ],
    },
    FieldRule {
        field: CanonicalField::BatteryCharging,
        aliases: &[
            sec("Battery", "Charging"),
            field("battery.charging"),
            field("charging"),
        ],
    },
    FieldRule {
        field: CanonicalField::BatteryWirelessCharging,
        aliases: &[
            sec("Battery", "Wireless"),
            sec("Battery", "Wireless charging"),
            field("battery.wireless_charging"),
            field("wireless_charging"),
        ],
    },
];
