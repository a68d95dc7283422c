/// All of a user's anime lists, scores on the 100 point scale
pub const WATCH_LISTS: &str = r#"
query ($username: String) {
    MediaListCollection(userName: $username, type: ANIME) {
        lists {
            status
            entries {
                media {
                    meanScore
                }
                score(format: POINT_100)
                mediaId
            }
        }
    }
}
"#;

/// One title and the first page of its recommendations, best rated first
pub const MEDIA_RECOMMENDATIONS: &str = r#"
query ($id: Int) {
    Media(id: $id) {
        id
        title {
            english
            romaji
        }
        recommendations(sort: RATING_DESC, page: 1, perPage: 10) {
            nodes {
                mediaRecommendation {
                    id
                    title {
                        english
                        romaji
                    }
                    meanScore
                }
            }
        }
    }
}
"#;
