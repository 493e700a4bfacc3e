/// Constants used by leaf-group color synthesis.
pub mod palette {
    /// Base colors as `(blue, green, red)` triples, indexed by `leaf_index % 6`.
    pub const BASE_COLORS: [(u8, u8, u8); 6] = [
        (255, 0, 0),
        (0, 255, 0),
        (0, 0, 255),
        (255, 255, 0),
        (255, 0, 255),
        (0, 255, 255),
    ];
    /// Amount subtracted from every non-zero channel per full palette cycle.
    pub const DARKEN_STEP: usize = 20;
    /// Fixed alpha prefix of every KML color (`aabbggrr`).
    pub const OPACITY_PREFIX: &str = "ff";
    /// Leaf count up to which colors are guaranteed distinct.
    ///
    /// Distinctness actually holds for the first 78 leaves (13 cycles); past
    /// that every channel floors at zero and colors converge on `ff000000`.
    pub const DISTINCT_LEAF_BOUND: usize = 36;
}

/// Constants used by the KML serializer.
pub mod kml {
    /// Default KML namespace.
    pub const XMLNS: &str = "http://www.opengis.net/kml/2.2";
    /// Google extension namespace.
    pub const XMLNS_GX: &str = "http://www.google.com/kml/ext/2.2";
    /// Atom namespace.
    pub const XMLNS_ATOM: &str = "http://www.w3.org/2005/Atom";
    /// CSS class of the description wrapper used by Google Earth info windows.
    pub const INFO_WINDOW_CLASS: &str = "googft-info-window";
    /// Altitude written as the third coordinate component.
    pub const POINT_ALTITUDE: u8 = 0;
}

/// Darwin Core field names and the default description layout.
pub mod darwin {
    /// Default grouping path: genus folders containing species folders.
    pub const DEFAULT_GROUP_BY: [&str; 2] = ["genus", "specificEpithet"];
    /// Multi-key used for placemark names.
    pub const DEFAULT_NAME_KEY: &str = "genus specificEpithet subspecies";
    /// Longitude column.
    pub const LONGITUDE_KEY: &str = "decimalLongitude";
    /// Latitude column.
    pub const LATITUDE_KEY: &str = "decimalLatitude";
    /// Description rows as `(title, key)`; keys containing spaces are joined.
    pub const DEFAULT_COLUMNS: [(&str, &str); 20] = [
        ("Species", "genus specificEpithet subspecies"),
        ("Catalog Number", "catalogNumber"),
        ("Individual Count", "individualCount"),
        ("Sex", "sex"),
        ("Life Stage", "lifeStage"),
        ("Record Number", "recordNumber"),
        ("Collected By", "recordedBy"),
        ("Date Collected", "eventDate"),
        ("Habitat", "habitat"),
        ("Locality", "locality"),
        ("County", "county"),
        ("State/Province", "stateProvince"),
        ("Country", "country"),
        ("Elevation", "minimumElevationInMeters"),
        ("Uncertainty", "coordinateUncertaintyInMeters"),
        ("Family", "family"),
        ("Order", "order"),
        ("Preparations", "preparations"),
        ("Institution Code", "institutionCode"),
        ("Collection Code", "collectionCode"),
    ];
}

/// Separator used when joining multi-key values and ancestor paths.
pub const PATH_SEPARATOR: &str = " ";
