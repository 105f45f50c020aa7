// Format selection: collapse the raw variant list into user-facing
// quality options, one per vertical resolution.
//
// Policy for variants without audio: the per-height representative prefers
// a variant that already carries an audio track; when only video-only
// variants exist for a height the option is kept and flagged `needs_merge`
// so the orchestrator knows to fetch and mux a separate audio stream.

use std::collections::HashMap;

use super::models::{QualityOption, RawVariant, CODEC_DISPLAY_LEN};

/// Cap on the options returned to a client, highest resolutions first.
pub const MAX_OPTIONS: usize = 10;

/// Build the deduplicated, descending-by-resolution option list.
pub fn build_quality_options(variants: &[RawVariant]) -> Vec<QualityOption> {
    let mut by_height: HashMap<u32, &RawVariant> = HashMap::new();

    for variant in variants {
        if !variant.has_video() {
            continue;
        }
        let Some(height) = variant.height else {
            continue;
        };

        match by_height.get(&height) {
            // replace a video-only representative with an audio-carrying one
            Some(current) if !current.has_audio() && variant.has_audio() => {
                by_height.insert(height, variant);
            }
            Some(_) => {}
            None => {
                by_height.insert(height, variant);
            }
        }
    }

    let mut selected: Vec<(u32, &RawVariant)> = by_height.into_iter().collect();
    selected.sort_by(|a, b| b.0.cmp(&a.0));
    selected.truncate(MAX_OPTIONS);

    selected
        .into_iter()
        .map(|(height, variant)| to_option(height, variant))
        .collect()
}

fn to_option(height: u32, variant: &RawVariant) -> QualityOption {
    let filesize = variant.effective_size();
    let filesize_mb = filesize.map(|bytes| {
        let mb = bytes as f64 / 1_048_576.0;
        (mb * 100.0).round() / 100.0
    });

    let ext = variant
        .ext
        .as_deref()
        .filter(|e| !e.is_empty() && *e != "unknown")
        .unwrap_or("mp4")
        .to_string();

    let vcodec = variant
        .vcodec
        .as_deref()
        .unwrap_or("unknown")
        .chars()
        .take(CODEC_DISPLAY_LEN)
        .collect();

    QualityOption {
        format_id: variant.format_id.clone(),
        resolution: format!("{}p", height),
        ext,
        filesize,
        filesize_mb,
        fps: variant.fps,
        vcodec,
        needs_merge: !variant.has_audio(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::models::NO_CODEC;

    fn variant(format_id: &str, height: Option<u32>, vcodec: &str, acodec: &str) -> RawVariant {
        RawVariant {
            format_id: format_id.to_string(),
            height,
            fps: Some(30.0),
            vcodec: Some(vcodec.to_string()),
            acodec: Some(acodec.to_string()),
            ext: Some("mp4".to_string()),
            filesize: Some(50_000_000.0),
            filesize_approx: None,
        }
    }

    #[test]
    fn dedupes_per_height_and_prefers_audio() {
        // the scenario from the request contract: two 1080p variants (one
        // muxed, one video-only) plus one muxed 720p
        let variants = vec![
            variant("137", Some(1080), "avc1", NO_CODEC),
            variant("22", Some(1080), "avc1", "mp4a"),
            variant("18", Some(720), "avc1", "mp4a"),
        ];

        let options = build_quality_options(&variants);
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].resolution, "1080p");
        assert_eq!(options[0].format_id, "22");
        assert!(!options[0].needs_merge);
        assert_eq!(options[1].resolution, "720p");
        assert_eq!(options[1].format_id, "18");
    }

    #[test]
    fn audio_preference_is_order_independent() {
        let variants = vec![
            variant("muxed", Some(1080), "avc1", "mp4a"),
            variant("video-only", Some(1080), "avc1", NO_CODEC),
        ];
        let options = build_quality_options(&variants);
        assert_eq!(options[0].format_id, "muxed");
    }

    #[test]
    fn heights_strictly_descending() {
        let variants = vec![
            variant("a", Some(360), "avc1", "mp4a"),
            variant("b", Some(2160), "vp9", "opus"),
            variant("c", Some(720), "avc1", "mp4a"),
            variant("d", Some(1080), "avc1", "mp4a"),
        ];

        let options = build_quality_options(&variants);
        let heights: Vec<&str> = options.iter().map(|o| o.resolution.as_str()).collect();
        assert_eq!(heights, vec!["2160p", "1080p", "720p", "360p"]);
    }

    #[test]
    fn skips_audio_only_and_heightless_variants() {
        let variants = vec![
            variant("audio", None, NO_CODEC, "mp4a"),
            variant("no-height", None, "avc1", "mp4a"),
            variant("ok", Some(480), "avc1", "mp4a"),
        ];

        let options = build_quality_options(&variants);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].format_id, "ok");
    }

    #[test]
    fn video_only_catalog_flags_every_option() {
        let variants = vec![
            variant("v1", Some(1080), "avc1", NO_CODEC),
            variant("v2", Some(720), "avc1", NO_CODEC),
        ];

        let options = build_quality_options(&variants);
        assert_eq!(options.len(), 2);
        assert!(options.iter().all(|o| o.needs_merge));
    }

    #[test]
    fn size_mb_is_rounded_to_two_decimals() {
        let mut v = variant("x", Some(720), "avc1", "mp4a");
        v.filesize = Some(123_456_789.0);
        let options = build_quality_options(&[v]);
        // 123456789 / 1048576 = 117.7375...
        assert_eq!(options[0].filesize_mb, Some(117.74));
        assert_eq!(options[0].filesize, Some(123_456_789));
    }

    #[test]
    fn unknown_size_is_omitted() {
        let mut v = variant("x", Some(720), "avc1", "mp4a");
        v.filesize = None;
        let options = build_quality_options(&[v]);
        assert_eq!(options[0].filesize, None);
        assert_eq!(options[0].filesize_mb, None);
    }

    #[test]
    fn approximate_size_is_used_when_exact_unknown() {
        let mut v = variant("x", Some(720), "avc1", "mp4a");
        v.filesize = None;
        v.filesize_approx = Some(2_097_152.0);
        let options = build_quality_options(&[v]);
        assert_eq!(options[0].filesize_mb, Some(2.0));
    }

    #[test]
    fn codec_tag_is_truncated_for_display() {
        let mut v = variant("x", Some(720), "avc1.64002a.extremely.long.tag", "mp4a");
        v.vcodec = Some("avc1.64002a.extremely.long.tag".to_string());
        let options = build_quality_options(&[v]);
        assert_eq!(options[0].vcodec.chars().count(), 20);
        assert_eq!(options[0].vcodec, "avc1.64002a.extremel");
    }

    #[test]
    fn output_is_capped() {
        let variants: Vec<RawVariant> = (1..=15)
            .map(|i| variant(&format!("f{}", i), Some(i * 100), "avc1", "mp4a"))
            .collect();

        let options = build_quality_options(&variants);
        assert_eq!(options.len(), MAX_OPTIONS);
        assert_eq!(options[0].resolution, "1500p");
        assert_eq!(options.last().unwrap().resolution, "600p");
    }

    #[test]
    fn empty_input_yields_no_options() {
        assert!(build_quality_options(&[]).is_empty());
    }
}
