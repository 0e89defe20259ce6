//! Fixed token sets accepted by the Pixabay API
//!
//! Each enumeration maps one-to-one onto the lowercase tokens the API
//! expects. Matching is exact and case-sensitive.

use std::fmt;
use std::str::FromStr;

/// Error returned when a string is not a member of a token enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{token}' is not a valid {kind}")]
pub struct UnknownToken {
    pub kind: &'static str,
    pub token: String,
}

macro_rules! token_enum {
    (
        $(#[$meta:meta])*
        $name:ident => $kind:literal {
            $($variant:ident = $token:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every member, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Canonical token of every member, in declaration order.
            pub const TOKENS: &'static [&'static str] = &[$($token),+];

            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $token),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl FromStr for $name {
            type Err = UnknownToken;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($token => Ok(Self::$variant),)+
                    _ => Err(UnknownToken {
                        kind: $kind,
                        token: s.to_string(),
                    }),
                }
            }
        }
    };
}

token_enum! {
    /// Image categories.
    Category => "category" {
        Backgrounds = "backgrounds",
        Fashion = "fashion",
        Nature = "nature",
        Science = "science",
        Education = "education",
        Feelings = "feelings",
        Health = "health",
        People = "people",
        Religion = "religion",
        Places = "places",
        Animals = "animals",
        Industry = "industry",
        Computer = "computer",
        Food = "food",
        Sports = "sports",
        Transportation = "transportation",
        Travel = "travel",
        Buildings = "buildings",
        Business = "business",
        Music = "music",
    }
}

token_enum! {
    /// Dominant colors an image can be filtered by.
    Color => "color" {
        Grayscale = "grayscale",
        Transparent = "transparent",
        Red = "red",
        Orange = "orange",
        Yellow = "yellow",
        Green = "green",
        Turquoise = "turquoise",
        Blue = "blue",
        Lilac = "lilac",
        Pink = "pink",
        White = "white",
        Gray = "gray",
        Black = "black",
        Brown = "brown",
    }
}

token_enum! {
    /// Search languages (ISO 639-1 codes).
    Language => "language" {
        Cs = "cs",
        Da = "da",
        De = "de",
        En = "en",
        Es = "es",
        Fr = "fr",
        Id = "id",
        It = "it",
        Hu = "hu",
        Nl = "nl",
        No = "no",
        Pl = "pl",
        Pt = "pt",
        Ro = "ro",
        Sk = "sk",
        Fi = "fi",
        Sv = "sv",
        Tr = "tr",
        Vi = "vi",
        Th = "th",
        Bg = "bg",
        Ru = "ru",
        El = "el",
        Ja = "ja",
        Ko = "ko",
        Zh = "zh",
    }
}

token_enum! {
    Orientation => "orientation" {
        All = "all",
        Horizontal = "horizontal",
        Vertical = "vertical",
    }
}

token_enum! {
    /// Result ordering.
    Order => "order" {
        Popular = "popular",
        Latest = "latest",
    }
}

token_enum! {
    ImageType => "image type" {
        All = "all",
        Photo = "photo",
        Vector = "vector",
        Illustration = "illustration",
    }
}

token_enum! {
    VideoType => "video type" {
        All = "all",
        Film = "film",
        Animation = "animation",
    }
}

token_enum! {
    /// Sizes of the still preview image rendered for every video.
    VideoPreviewSize => "video preview size" {
        Size100x75 = "100x75",
        Size200x150 = "200x150",
        Size295x166 = "295x166",
        Size640x360 = "640x360",
        Size960x540 = "960x540",
        Size1920x1080 = "1920x1080",
    }
}

token_enum! {
    /// Canonical query parameter keys understood by the API.
    Param => "parameter" {
        Q = "q",
        Lang = "lang",
        ImageType = "image_type",
        VideoType = "video_type",
        Orientation = "orientation",
        Category = "category",
        MinWidth = "min_width",
        MinHeight = "min_height",
        Colors = "colors",
        EditorsChoice = "editors_choice",
        SafeSearch = "safe_search",
        Order = "order",
        Page = "page",
        PerPage = "per_page",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_match_variants() {
        for (variant, token) in Category::ALL.iter().zip(Category::TOKENS) {
            assert_eq!(variant.as_str(), *token);
        }
        assert_eq!(Category::ALL.len(), 20);
        assert_eq!(Color::ALL.len(), 14);
        assert_eq!(Language::ALL.len(), 26);
        assert_eq!(Param::ALL.len(), 14);
    }

    #[test]
    fn test_from_str_round_trip() {
        for lang in Language::ALL {
            assert_eq!(lang.as_str().parse::<Language>().unwrap(), *lang);
        }
        assert_eq!("1920x1080".parse::<VideoPreviewSize>().unwrap(), VideoPreviewSize::Size1920x1080);
        assert_eq!("per_page".parse::<Param>().unwrap(), Param::PerPage);
    }

    #[test]
    fn test_from_str_is_case_sensitive() {
        let err = "Nature".parse::<Category>().unwrap_err();
        assert_eq!(err.kind, "category");
        assert_eq!(err.token, "Nature");
        assert!("EN".parse::<Language>().is_err());
        assert!("".parse::<Order>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Color::Turquoise.to_string(), "turquoise");
        assert_eq!(ImageType::Illustration.to_string(), "illustration");
        assert_eq!(Param::EditorsChoice.to_string(), "editors_choice");
    }

    #[test]
    fn test_unknown_token_display() {
        let err = "mkv".parse::<VideoType>().unwrap_err();
        assert_eq!(err.to_string(), "'mkv' is not a valid video type");
    }
}
