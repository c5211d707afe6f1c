//! 프레이즈 클러스터링
//!
//! 키워드를 공백 토큰 기준으로 묶는다. 남은 키워드 중 가장 많이 등장하는
//! 토큰을 골라 그 토큰을 공유하는 키워드를 한 그룹으로 떼어내는 탐욕
//! 방식이라 입력이 같으면 결과도 항상 같다. 최소 크기에 못 미치는
//! 키워드는 노이즈 그룹으로 보낸다.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::{KeywordRecord, NOISE_LABEL, PhraseGroup};

/// 클러스터링 전략 시그니처. 구현을 바꿔 끼울 수 있도록 트레이트로 둔다.
pub trait PhraseClusterer {
    fn cluster(&self, records: &[KeywordRecord]) -> Vec<PhraseGroup>;
}

/// 토큰 공유 기반 탐욕 클러스터러
pub struct LexicalClusterer {
    min_cluster_size: usize,
}

impl LexicalClusterer {
    pub fn new(min_cluster_size: usize) -> Self {
        Self {
            // 0이면 무한 루프가 되므로 1로 끌어올린다
            min_cluster_size: min_cluster_size.max(1),
        }
    }
}

fn tokens(keyword: &str) -> BTreeSet<&str> {
    keyword.split_whitespace().collect()
}

/// 그룹 라벨: 구성원 노출수 합이 큰 토큰 상위 2개를 '·'로 연결
fn label_for(members: &[&KeywordRecord]) -> String {
    let mut weights: BTreeMap<&str, u64> = BTreeMap::new();
    for record in members {
        for token in tokens(&record.keyword) {
            *weights.entry(token).or_insert(0) += record.impressions;
        }
    }

    let mut ranked: Vec<(&str, u64)> = weights.into_iter().collect();
    // 노출수 내림차순, 동률이면 사전순
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    ranked
        .iter()
        .take(2)
        .map(|(token, _)| *token)
        .collect::<Vec<_>>()
        .join("·")
}

impl PhraseClusterer for LexicalClusterer {
    fn cluster(&self, records: &[KeywordRecord]) -> Vec<PhraseGroup> {
        if records.is_empty() {
            return Vec::new();
        }

        // 토큰 -> 레코드 인덱스. BTreeMap이라 탐색 순서가 고정된다.
        let mut token_index: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (i, record) in records.iter().enumerate() {
            for token in tokens(&record.keyword) {
                token_index.entry(token).or_default().push(i);
            }
        }

        let mut assigned = vec![false; records.len()];
        let mut groups: Vec<PhraseGroup> = Vec::new();

        loop {
            let mut best: Option<(&str, usize)> = None;
            for (token, indices) in &token_index {
                let coverage = indices.iter().filter(|&&i| !assigned[i]).count();
                if coverage > best.map_or(0, |(_, c)| c) {
                    best = Some((*token, coverage));
                }
            }

            let Some((seed, coverage)) = best else {
                break;
            };
            if coverage < self.min_cluster_size {
                break;
            }

            let member_indices: Vec<usize> = token_index[seed]
                .iter()
                .copied()
                .filter(|&i| !assigned[i])
                .collect();
            for &i in &member_indices {
                assigned[i] = true;
            }
            let members: Vec<&KeywordRecord> =
                member_indices.iter().map(|&i| &records[i]).collect();

            let label = label_for(&members);
            debug!("프레이즈 '{}' 생성: {}개 키워드 (시드 토큰 '{}')", label, members.len(), seed);

            let owned: Vec<KeywordRecord> = members.into_iter().cloned().collect();
            groups.push(PhraseGroup::from_records(&label, &owned));
        }

        // 총 노출 내림차순 정렬, 노이즈는 항상 마지막
        groups.sort_by(|a, b| b.total_impressions.cmp(&a.total_impressions));

        let leftovers: Vec<KeywordRecord> = records
            .iter()
            .enumerate()
            .filter(|(i, _)| !assigned[*i])
            .map(|(_, r)| r.clone())
            .collect();
        if !leftovers.is_empty() {
            debug!("노이즈 그룹: {}개 키워드", leftovers.len());
            groups.push(PhraseGroup::from_records(NOISE_LABEL, &leftovers));
        }

        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(keyword: &str, imp: u64, clicks: u64) -> KeywordRecord {
        KeywordRecord::new(keyword, imp, clicks)
    }

    fn fixture() -> Vec<KeywordRecord> {
        vec![
            record("원피스 겨울", 500, 10),
            record("원피스 여름", 300, 6),
            record("원피스 롱", 200, 2),
            record("니트 원피스", 100, 1),
            record("코트 남성", 50, 1),
            record("장갑", 10, 0),
        ]
    }

    #[test]
    fn groups_by_shared_token() {
        let clusterer = LexicalClusterer::new(3);
        let groups = clusterer.cluster(&fixture());

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].keywords.len(), 4);
        assert!(groups[0].phrase.contains("원피스"));
        assert!(groups[1].is_noise());
        assert_eq!(groups[1].keywords.len(), 2);
    }

    #[test]
    fn label_joins_top_two_tokens_by_impressions() {
        let clusterer = LexicalClusterer::new(2);
        let groups = clusterer.cluster(&[
            record("원피스 겨울", 500, 10),
            record("원피스 겨울 세일", 400, 8),
        ]);
        // 원피스=900, 겨울=900(동률이면 사전순), 세일=400
        assert_eq!(groups[0].phrase, "겨울·원피스");
    }

    #[test]
    fn min_size_one_leaves_no_noise() {
        let clusterer = LexicalClusterer::new(1);
        let groups = clusterer.cluster(&fixture());
        assert!(groups.iter().all(|g| !g.is_noise()));
        let total: usize = groups.iter().map(|g| g.keywords.len()).sum();
        assert_eq!(total, 6);
    }

    #[test]
    fn zero_min_size_is_clamped() {
        let clusterer = LexicalClusterer::new(0);
        let groups = clusterer.cluster(&[record("하나", 1, 0)]);
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn groups_sorted_by_impressions_noise_last() {
        let clusterer = LexicalClusterer::new(2);
        let groups = clusterer.cluster(&[
            record("니트 가디건", 10, 0),
            record("니트 베스트", 20, 0),
            record("패딩 롱", 1000, 5),
            record("패딩 숏", 2000, 9),
            record("장갑", 99999, 1),
        ]);

        // 노이즈(장갑)가 노출수는 가장 크지만 항상 마지막
        assert_eq!(groups.len(), 3);
        assert!(groups.last().unwrap().is_noise());
        assert_eq!(groups[0].total_impressions, 3000);
        assert_eq!(groups[1].total_impressions, 30);
    }

    #[test]
    fn deterministic_output() {
        let clusterer = LexicalClusterer::new(3);
        let a = clusterer.cluster(&fixture());
        let b = clusterer.cluster(&fixture());
        assert_eq!(a, b);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let clusterer = LexicalClusterer::new(5);
        assert!(clusterer.cluster(&[]).is_empty());
    }
}
