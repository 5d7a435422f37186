//! 选诗器
//!
//! 从诗集中均匀随机选出一首；不要求密码学随机，只要求多次调用统计均匀。

use rand::Rng;

use crate::core::SelectError;

use super::{Corpus, PoemRecord};

/// 选诗器
pub struct PoemSelector;

impl PoemSelector {
    /// 使用线程本地随机源选诗
    pub fn select(corpus: &Corpus) -> Result<&PoemRecord, SelectError> {
        Self::select_with(corpus, &mut rand::thread_rng())
    }

    /// 使用指定随机源选诗；空诗集直接报错，不消耗随机数
    pub fn select_with<'c, R: Rng + ?Sized>(
        corpus: &'c Corpus,
        rng: &mut R,
    ) -> Result<&'c PoemRecord, SelectError> {
        if corpus.is_empty() {
            return Err(SelectError::EmptyCorpus);
        }
        let index = rng.gen_range(0..corpus.len());
        Ok(&corpus.as_slice()[index])
    }
}
