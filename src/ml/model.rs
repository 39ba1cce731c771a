use burn::{
    nn::{Linear, LinearConfig},
    prelude::*,
};

/// Sentence relevance head: one linear unit + sigmoid per sentence.
#[derive(Config, Debug)]
pub struct RelevanceHeadConfig {
    pub input_dim: usize,
}

impl RelevanceHeadConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> RelevanceHead<B> {
        let linear = LinearConfig::new(self.input_dim, 1).init(device);
        RelevanceHead { linear }
    }
}

#[derive(Module, Debug)]
pub struct RelevanceHead<B: Backend> {
    pub linear: Linear<B>,
}

impl<B: Backend> RelevanceHead<B> {
    /// vectors: [num_sentences, input_dim] → probabilities: [num_sentences]
    pub fn forward(&self, vectors: Tensor<B, 2>) -> Tensor<B, 1> {
        let [num_sentences, _] = vectors.dims();
        let logits = self.linear.forward(vectors); // [num_sentences, 1]
        burn::tensor::activation::sigmoid(logits).reshape([num_sentences])
    }
}
